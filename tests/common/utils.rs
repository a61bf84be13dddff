#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use once_cell::sync::Lazy;
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;
use wiremock::MockServer;

use smart_vitals_backend::run;
use smart_vitals_backend::config::chat::ChatSettings;
use smart_vitals_backend::config::jwt::JwtSettings;
use smart_vitals_backend::config::media::UploadLimits;
use smart_vitals_backend::db::InMemoryHealthStore;
use smart_vitals_backend::services::llm_service::LLMService;
use smart_vitals_backend::services::media_host::LocalMediaHost;
use smart_vitals_backend::telemetry::{get_subscriber, init_subscriber};

pub const TEST_JWT_SECRET: &str = "integration-test-secret";

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    /// Stands in for the generative-text service.
    pub chat_server: MockServer,
    /// Kept alive for the duration of the test.
    pub media_dir: TempDir,
    pub upload_limits: UploadLimits,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let chat_server = MockServer::start().await;
    let mut chat_settings = ChatSettings::new(chat_server.uri(), "test-model".to_string());
    chat_settings.timeout_secs = 2;
    chat_settings.max_retries = 1;
    chat_settings.retry_interval_ms = 10;
    let llm_service = LLMService::new(&chat_settings).expect("Failed to build LLM client");

    let media_dir = tempfile::tempdir().expect("Failed to create media dir");
    let media_host = LocalMediaHost::new(media_dir.path(), "/media")
        .await
        .expect("Failed to create media host");

    let upload_limits = UploadLimits::default();

    let server = run(
        listener,
        Arc::new(InMemoryHealthStore::new()),
        JwtSettings::new(TEST_JWT_SECRET.to_string(), None),
        Arc::new(media_host),
        upload_limits,
        llm_service,
        vec!["http://localhost:3000".to_string()],
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        chat_server,
        media_dir,
        upload_limits,
    }
}

/// A fresh user id and a valid bearer token for it.
pub fn create_test_user() -> (String, String) {
    let user_id = format!("user_{}", Uuid::new_v4());
    let token = token_for(&user_id);
    (user_id, token)
}

pub fn token_for(user_id: &str) -> String {
    sign_token(user_id, TEST_JWT_SECRET, Utc::now().timestamp() + 3600)
}

pub fn sign_token(user_id: &str, secret: &str, exp: i64) -> String {
    let claims = json!({
        "sub": user_id,
        "exp": exp,
        "email": format!("{}@example.com", user_id),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to sign token")
}
