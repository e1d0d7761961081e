//! Application Error Types
//!
//! Centralized error handling with Axum integration.
//!
//! Every error body is a JSON object carrying a `message` field. Expected
//! failures (validation, not-found, unauthorized) surface their specific
//! message; anything unexpected is logged and reported as a fixed
//! `"Server error"` with status 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Fixed message returned for every 5xx response.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_)
            | AppError::Upstream(_)
            | AppError::Database(_)
            | AppError::Redis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to a client. Server-side causes are hidden.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::Validation { message, .. } => message.clone(),
            AppError::Internal(_)
            | AppError::Upstream(_)
            | AppError::Database(_)
            | AppError::Redis(_) => SERVER_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Upstream(msg) => tracing::error!("Upstream error: {}", msg),
            AppError::Database(e) => tracing::error!("Database error: {}", e),
            AppError::Redis(e) => tracing::error!("Redis error: {}", e),
            _ => {}
        }

        let message = self.public_message();
        let errors = match self {
            AppError::Validation { errors, .. } if !errors.is_empty() => Some(errors),
            _ => None,
        };

        (status, Json(ErrorResponse { message, errors })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(AppError::NotFound("x".into()), StatusCode::NOT_FOUND ; "not found")]
    #[test_case(AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST ; "bad request")]
    #[test_case(AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED ; "unauthorized")]
    #[test_case(AppError::Forbidden("x".into()), StatusCode::FORBIDDEN ; "forbidden")]
    #[test_case(AppError::Conflict("x".into()), StatusCode::CONFLICT ; "conflict")]
    #[test_case(AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR ; "internal")]
    #[test_case(AppError::Upstream("x".into()), StatusCode::INTERNAL_SERVER_ERROR ; "upstream")]
    fn test_status_mapping(error: AppError, expected: StatusCode) {
        assert_eq!(error.status(), expected);
    }

    #[test]
    fn test_internal_errors_hide_cause() {
        let error = AppError::Internal("connection reset by peer".into());
        assert_eq!(error.public_message(), SERVER_ERROR_MESSAGE);
    }

    #[test]
    fn test_expected_errors_keep_message() {
        let error = AppError::NotFound("Post not found".into());
        assert_eq!(error.public_message(), "Post not found");
    }

    #[tokio::test]
    async fn test_response_body_has_message_field() {
        let response = AppError::Forbidden("Nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Nope");
        assert!(body.get("errors").is_none());
    }
}
