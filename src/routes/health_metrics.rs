use actix_web::web;

use crate::handlers::health_metrics::{meals, sleep, water, weight};

pub fn init_health_metric_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/water")
            .route(web::post().to(water::record_water))
            .route(web::get().to(water::get_water))
    );
    cfg.service(
        web::resource("/weight")
            .route(web::post().to(weight::record_weight))
            .route(web::get().to(weight::get_weight))
    );
    cfg.service(
        web::resource("/sleep")
            .route(web::post().to(sleep::record_sleep))
            .route(web::get().to(sleep::get_sleep))
    );
    cfg.service(
        web::resource("/meals")
            .route(web::post().to(meals::record_meal))
            .route(web::get().to(meals::get_meals))
    );
}
