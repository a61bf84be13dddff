use std::net::TcpListener;

use smart_vitals_backend::run;
use smart_vitals_backend::config::settings::{get_config, get_jwt_settings};
use smart_vitals_backend::db::build_store;
use smart_vitals_backend::services::llm_service::LLMService;
use smart_vitals_backend::services::media_host::build_media_host;
use smart_vitals_backend::telemetry::{get_subscriber, init_subscriber};

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    tracing::error!("{}: {}", context, e);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = get_config().map_err(|e| {
        eprintln!("Failed to read the config: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let subscriber = get_subscriber(
        "smart-vitals-backend".into(),
        config.application.log_level.clone(),
        std::io::stdout
    );
    init_subscriber(subscriber);

    let jwt_settings = get_jwt_settings(&config);

    let store = build_store(config.storage.backend, &config.database)
        .await
        .map_err(|e| startup_error("Failed to initialise storage", e))?;

    let media_host = build_media_host(&config.media)
        .await
        .map_err(|e| startup_error("Failed to initialise media host", e))?;

    let llm_service = LLMService::new(&config.chat)
        .map_err(|e| startup_error("Failed to create LLM client", e))?;

    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Listening on {}", address);

    run(
        listener,
        store,
        jwt_settings,
        media_host,
        config.media.upload_limits(),
        llm_service,
        config.application.allowed_origins.clone(),
    )?.await
}
