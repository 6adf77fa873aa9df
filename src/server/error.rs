//! HTTP error mapping.
//!
//! Callers only ever see two messages; the underlying error is logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::any::Any;

use crate::models::BadgeError;

pub const INVALID_ADDRESS_MESSAGE: &str = "Valid Ethereum address is required";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed `address` query parameter.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Lookup or render failure.
    #[error(transparent)]
    Internal(BadgeError),
}

impl From<BadgeError> for ApiError {
    fn from(err: BadgeError) -> Self {
        match err {
            BadgeError::InvalidAddress(input) => ApiError::InvalidAddress(input),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidAddress(input) => {
                tracing::debug!(input = %input, "rejected badge request");
                (StatusCode::BAD_REQUEST, INVALID_ADDRESS_MESSAGE)
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "error processing badge request");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Response for a handler that panicked, so the client still gets the
/// generic 500 body instead of a dropped connection.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "badge handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}
