use actix_web::web;

use crate::handlers::media::image_upload;

pub fn init_upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/uploads")
            .route("/image", web::post().to(image_upload::upload_image))
            .route("/images", web::post().to(image_upload::upload_images))
    );
}

/// Public: stored images are referenced by URL from meal records.
pub fn init_media_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/media/{key}")
            .route(web::get().to(image_upload::serve_media))
    );
}
