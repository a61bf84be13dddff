use serde::{Deserialize, Serialize};

/// Body sent with every non-2xx response
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    pub error: String,
}

impl ApiResponse {
    pub fn error_with_message(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: error.into(),
        }
    }
}
