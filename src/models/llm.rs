use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Body of a non-streaming `/api/generate` call.
#[derive(Debug, Serialize, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: GenerateOptions,
}

#[derive(Debug, Serialize, Clone)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub num_predict: u32,
    pub top_p: f32,
    pub top_k: u32,
    pub repeat_penalty: f32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            num_predict: 300,
            top_p: 0.9,
            top_k: 40,
            repeat_penalty: 1.1,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}

#[derive(Debug, ThisError)]
pub enum LLMError {
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("Request timeout")]
    Timeout,
    #[error("Rate limited")]
    RateLimited,
}

impl LLMError {
    /// Short machine-readable label reported alongside fallback replies.
    pub fn reason(&self) -> &'static str {
        match self {
            LLMError::NetworkError(_) => "network_error",
            LLMError::InvalidResponse(_) => "invalid_response",
            LLMError::ServiceUnavailable(_) => "service_unavailable",
            LLMError::Timeout => "timeout",
            LLMError::RateLimited => "rate_limited",
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LLMError::NetworkError(_) | LLMError::ServiceUnavailable(_) | LLMError::Timeout
        )
    }
}
