//! Wheel API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use wheel_core::error::DomainError;
use wheel_store::json_file_store::StoreFileError;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// An environment variable is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The store could not be opened, read or written.
    #[error("store error: {0}")]
    Store(#[from] DomainError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

impl From<StoreFileError> for AppError {
    fn from(err: StoreFileError) -> Self {
        Self::Store(err.into())
    }
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::InvalidItem(_) => (StatusCode::BAD_REQUEST, "invalid_item"),
            DomainError::ItemNotFound(_) => (StatusCode::NOT_FOUND, "item_not_found"),
            DomainError::ConcurrentDraw => (StatusCode::CONFLICT, "concurrent_draw"),
            DomainError::EmptyPool => (StatusCode::UNPROCESSABLE_ENTITY, "empty_pool"),
            DomainError::NoAvailableItems => {
                (StatusCode::UNPROCESSABLE_ENTITY, "no_available_items")
            }
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        if status.is_server_error() {
            tracing::warn!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
