use actix_web::web;

use crate::handlers::mental_health;

pub fn init_mental_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/mental-health")
            .route("/chat", web::post().to(mental_health::send_chat_message))
            .route("/history", web::get().to(mental_health::get_chat_history))
    );
}
