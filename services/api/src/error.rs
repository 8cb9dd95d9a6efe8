//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service, plus the
//! translation of core errors into HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::config::ConfigError;
use bookstore_core::error::{AuthError, CoreError};

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from the core record services.
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Core(CoreError::Auth(err))
    }
}

/// The JSON body every failed request carries.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Core(core) => match core {
                CoreError::Validation(_) => (StatusCode::BAD_REQUEST, core.to_string()),
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
                CoreError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
                CoreError::Ownership(msg) => (StatusCode::FORBIDDEN, msg.clone()),
                CoreError::Auth(auth) => (StatusCode::UNAUTHORIZED, auth.to_string()),
                // Filesystem detail stays in the server log; the client gets
                // a generic message.
                CoreError::Storage(detail) => {
                    error!("storage failure: {detail}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            other => {
                error!("unexpected failure: {other}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
