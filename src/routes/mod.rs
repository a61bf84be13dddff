use actix_web::web;

pub mod health_metrics;
pub mod mental_health;
pub mod media;

use crate::handlers::backend_health_handler::backend_health_check;
use crate::middleware::auth::AuthMiddleware;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/backend_health", web::get().to(backend_health_check));
    cfg.configure(media::init_media_routes);

    // Everything under /api requires a bearer token
    cfg.service(
        web::scope("/api")
            .wrap(AuthMiddleware)
            .configure(health_metrics::init_health_metric_routes)
            .configure(mental_health::init_mental_health_routes)
            .configure(media::init_upload_routes)
    );
}
