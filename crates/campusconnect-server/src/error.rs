//! HTTP error mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use campusconnect_core::CoreError;
use campusconnect_storage::StorageError;

/// Error type returned by request handlers.
///
/// Notification failures never surface here; dispatch outcomes are advisory
/// and reported inside success responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        if err.is_not_found() {
            Self::NotFound(err.to_string())
        } else if err.is_already_exists() {
            Self::Conflict(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_mapping() {
        let err: ApiError = StorageError::not_found("event", "abc").into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = StorageError::already_exists("user", "a@x.com").into();
        assert!(matches!(err, ApiError::Conflict(_)));

        let err: ApiError = StorageError::internal("boom").into();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_core_error_maps_to_bad_request() {
        let err: ApiError = CoreError::invalid_event("title must not be empty").into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
