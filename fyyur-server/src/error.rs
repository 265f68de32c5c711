//! Error types for fyyur-server read paths

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Malformed request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body axum could not extract; keeps the extractor's status
    #[error("Rejected request: {1}")]
    Rejected(StatusCode, String),

    /// Store, projection or validation failure
    #[error(transparent)]
    Common(#[from] fyyur_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use fyyur_common::Error;

        let (status, error_code, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Rejected(status, msg) => (status, "BAD_REQUEST", msg),
            ApiError::Common(err) => match err {
                Error::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
                Error::Validation(errors) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "VALIDATION_ERROR",
                    errors.to_string(),
                ),
                Error::ReferentialIntegrity(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "REFERENTIAL_INTEGRITY",
                    "A referenced venue or artist does not exist".to_string(),
                ),
                err @ (Error::DataIntegrity(_) | Error::NaiveTimestamp(_)) => {
                    error!("Stored data failed projection: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "DATA_INTEGRITY",
                        err.to_string(),
                    )
                }
                err => {
                    error!("Request failed: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
