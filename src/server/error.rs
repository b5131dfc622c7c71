//! HTTP error handling and response formatting.
//!
//! Maps store and registry failures onto status codes with a JSON body of
//! the form `{"error": "...", "code": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::registry::RegistryError;
use crate::subscription::StoreError;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code.
    pub code: &'static str,
}

/// Application error type that converts to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Subscription store failure.
    Store(StoreError),
    /// Stream could not be opened.
    Registry(RegistryError),
    /// Post could not be persisted.
    PostSave(StoreError),
    /// Request was missing something.
    BadRequest(String),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        ApiError::Registry(e)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Store(e) => write!(f, "{}", e),
            ApiError::Registry(e) => write!(f, "{}", e),
            ApiError::PostSave(e) => write!(f, "Failed to save post: {}", e),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Store(StoreError::Unavailable(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE")
            }
            ApiError::Store(StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "SUBSCRIPTION_NOT_FOUND")
            }
            ApiError::Store(StoreError::InvalidInput(_)) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Store(StoreError::Backend(_)) => (StatusCode::BAD_GATEWAY, "STORE_ERROR"),
            ApiError::Registry(_) => (StatusCode::SERVICE_UNAVAILABLE, "CAPACITY_EXCEEDED"),
            ApiError::PostSave(_) => (StatusCode::INTERNAL_SERVER_ERROR, "POST_SAVE_FAILED"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let error = match &self {
            ApiError::PostSave(e) => {
                tracing::error!(error = %e, "Failed to save post");
                "Failed to save post".to_string()
            }
            ApiError::Store(e @ (StoreError::Unavailable(_) | StoreError::Backend(_))) => {
                tracing::warn!(error = %e, "Subscription store request failed");
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { error, code })).into_response()
    }
}
