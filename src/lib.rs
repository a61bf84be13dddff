use actix_web::{http, web, App, HttpServer};
use actix_web::dev::Server;
use actix_multipart::form::MultipartFormConfig;
use tracing_actix_web::TracingLogger;
use std::net::TcpListener;
use std::sync::Arc;
use actix_cors::Cors;

pub mod config;
pub mod telemetry;
mod routes;
mod handlers;
pub mod models;
pub mod utils;
mod middleware;
pub mod db;
pub mod services;
use crate::routes::init_routes;
use crate::config::jwt::JwtSettings;
use crate::config::media::UploadLimits;
use crate::db::HealthStore;
use crate::models::error::AppError;
use crate::services::aggregator::MetricAggregator;
use crate::services::conversation_service::ConversationService;
use crate::services::llm_service::LLMService;
use crate::services::media_host::MediaHost;
use crate::services::recorder::MetricRecorder;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn HealthStore>,
    jwt_settings: JwtSettings,
    media_host: Arc<dyn MediaHost>,
    upload_limits: UploadLimits,
    llm_service: LLMService,
    allowed_origins: Vec<String>,
) -> Result<Server, std::io::Error> {
    // Wrap using web::Data, which boils down to an Arc smart pointer
    let recorder = web::Data::new(MetricRecorder::new(store.clone()));
    let aggregator = web::Data::new(MetricAggregator::new(store.clone()));
    let conversation = web::Data::new(ConversationService::new(store, llm_service));
    let jwt_settings = web::Data::new(jwt_settings);
    let media_host: web::Data<dyn MediaHost> = web::Data::from(media_host);
    // Only the single-image form goes through the form extractor; the
    // multi-file route streams parts and enforces its own limits.
    let upload_total_limit = upload_limits.single_request_limit();
    let upload_limits = web::Data::new(upload_limits);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .supports_credentials()
            .max_age(3600);
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError::Validation(format!("Invalid request body: {}", err)).into()
        });
        let query_config = web::QueryConfig::default().error_handler(|err, _req| {
            AppError::Validation(format!("Invalid query string: {}", err)).into()
        });
        let multipart_config = MultipartFormConfig::default()
            .total_limit(upload_total_limit)
            .error_handler(|err, _req| {
                AppError::Validation(format!("Invalid multipart upload: {}", err)).into()
            });

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(json_config)
            .app_data(query_config)
            .app_data(multipart_config)
            .app_data(jwt_settings.clone())
            .app_data(recorder.clone())
            .app_data(aggregator.clone())
            .app_data(conversation.clone())
            .app_data(media_host.clone())
            .app_data(upload_limits.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
