//! Error types and Axum response conversions.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application error types.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Internal(msg) => {
                // Log detailed error server-side, return generic message to client
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<crate::storage::StoreError> for AppError {
    fn from(err: crate::storage::StoreError) -> Self {
        use crate::storage::StoreError;
        // Store errors carry user-facing, non-revealing messages at the
        // boundary; the internal distinction stays in logs at the call site.
        match err {
            StoreError::InvalidInviteCode => {
                AppError::BadRequest("Invite code is invalid.".to_string())
            }
            StoreError::ExpiredInviteCode => {
                AppError::BadRequest("Invite code has expired.".to_string())
            }
            StoreError::ExhaustedInviteCode => {
                AppError::BadRequest("Invite code has no remaining uses.".to_string())
            }
            StoreError::EmailExists => AppError::Conflict("Email already exists.".to_string()),
            StoreError::DuplicateInviteCode => {
                AppError::Internal("Invite code collision".to_string())
            }
            StoreError::ResetTokenInvalid => AppError::BadRequest(
                "Invalid or expired reset link. Please request a new one.".to_string(),
            ),
        }
    }
}
