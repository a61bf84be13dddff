use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error as ThisError;

use crate::db::StoreError;
use crate::models::common::ApiResponse;
use crate::models::media::MediaError;

/// Every failure a handler can surface to a client.
#[derive(Debug, ThisError)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidRange(String),
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Authentication required")]
    Authentication,
    #[error("Access to another user's records is not allowed")]
    Forbidden,
    #[error("Upstream service error: {0}")]
    UpstreamService(String),
    #[error("Storage is currently unavailable")]
    StorageUnavailable(String),
}

impl AppError {
    /// Stable name of the error class, sent as the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            // A range violation is reported to clients as a validation failure
            AppError::Validation(_) | AppError::InvalidRange(_) => "ValidationError",
            AppError::MissingParameter(_) => "MissingParameterError",
            AppError::Authentication => "AuthenticationError",
            AppError::Forbidden => "ForbiddenError",
            AppError::UpstreamService(_) => "UpstreamServiceError",
            AppError::StorageUnavailable(_) => "StorageUnavailableError",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::InvalidRange(_)
            | AppError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::UpstreamService(_) => StatusCode::BAD_GATEWAY,
            AppError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(ApiResponse::error_with_message(self.to_string(), self.kind()))
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        tracing::error!("Storage error: {}", e);
        AppError::StorageUnavailable(e.to_string())
    }
}

impl From<MediaError> for AppError {
    fn from(e: MediaError) -> Self {
        tracing::error!("Media host error: {}", e);
        AppError::UpstreamService(e.to_string())
    }
}
