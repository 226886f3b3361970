use crate::services::storage_service::StorageError;
use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Message returned whenever a request needs the bucket and none is set.
pub const BUCKET_NOT_CONFIGURED: &str = "S3_BUCKET is not configured";

/// A lightweight wrapper for handler errors that keeps the message local.
/// Rendered as `{"ok": false, "error": message}`.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 413 Payload Too Large
    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, msg)
    }

    /// The bucket is not configured.
    pub fn bucket_not_configured() -> Self {
        Self::internal(BUCKET_NOT_CONFIGURED)
    }

    /// Storage failure surfaced with the backend's own status code.
    /// `fallback` replaces an empty backend message.
    pub fn from_storage(err: StorageError, fallback: &str) -> Self {
        let status = err.status_code();
        Self::new(status, message_or(err, fallback))
    }

    /// Storage failure surfaced as a plain 500, whatever the backend said.
    pub fn storage_internal(err: StorageError, fallback: &str) -> Self {
        Self::internal(message_or(err, fallback))
    }
}

fn message_or(err: StorageError, fallback: &str) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "ok": false,
            "error": self.message,
        }));

        (self.status, body).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::new(err.status(), err.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::new(rejection.status(), rejection.body_text())
    }
}
