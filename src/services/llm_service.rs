use std::time::Duration;
use reqwest::Client;
use tokio_retry::{strategy::FixedInterval, RetryIf};

use crate::config::chat::ChatSettings;
use crate::models::llm::{GenerateOptions, GenerateRequest, GenerateResponse, LLMError};

/// Client for an Ollama-compatible text generation endpoint.
#[derive(Clone)]
pub struct LLMService {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
    max_retries: usize,
    retry_interval: Duration,
}

impl LLMService {
    pub fn new(settings: &ChatSettings) -> Result<Self, LLMError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = Client::builder()
            .timeout(timeout + Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            timeout,
            max_retries: settings.max_retries,
            retry_interval: Duration::from_millis(settings.retry_interval_ms),
        })
    }

    /// Generate a completion, retrying transient failures at a fixed interval.
    pub async fn generate(&self, prompt: &str) -> Result<String, LLMError> {
        let retry_strategy = FixedInterval::new(self.retry_interval).take(self.max_retries);

        RetryIf::spawn(
            retry_strategy,
            || self.call(prompt),
            |e: &LLMError| {
                let retry = e.is_transient();
                if retry {
                    tracing::warn!("LLM call failed, retrying: {}", e);
                }
                retry
            },
        )
        .await
    }

    /// Make actual HTTP call
    async fn call(&self, prompt: &str) -> Result<String, LLMError> {
        tracing::debug!("Calling LLM service at {} with model {}", self.base_url, self.model);

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: GenerateOptions::default(),
        };

        let response = self.client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LLMError::Timeout
                } else {
                    LLMError::NetworkError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            tracing::error!("LLM API error {}: {}", status, error_text);

            return Err(match status.as_u16() {
                404 => LLMError::InvalidResponse(format!("Model not found: {}", error_text)),
                429 => LLMError::RateLimited,
                500..=599 => LLMError::ServiceUnavailable(error_text),
                _ => LLMError::InvalidResponse(format!("HTTP {}: {}", status, error_text))
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(format!("Malformed body: {}", e)))?;

        let content = generated.response.trim();
        if content.is_empty() {
            return Err(LLMError::InvalidResponse("Empty content".to_string()));
        }

        Ok(content.to_string())
    }
}
