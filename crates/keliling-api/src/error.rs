//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use keliling_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable message.
    pub error: String,
    /// Machine-readable error code.
    pub code: String,
}

/// HTTP-facing wrapper so handlers can return `Result<_, ApiError>` and use
/// `?` on any `AppResult`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status code for an error kind.
    pub fn status(kind: ErrorKind) -> StatusCode {
        match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Transient | ErrorKind::Configuration | ErrorKind::Unexpected => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = Self::status(err.kind);

        let message = match err.kind {
            ErrorKind::Transient => {
                error!(error = %err, source = ?err.source, "Storage failure");
                err.message
            }
            ErrorKind::Configuration | ErrorKind::Unexpected => {
                error!(error = %err, source = ?err.source, "Internal server error");
                "Internal server error".to_string()
            }
            ErrorKind::Validation => {
                warn!(error = %err, source = ?err.source, "Rejected request");
                err.message
            }
            _ => err.message,
        };

        let body = ApiErrorResponse {
            error: message,
            code: err.kind.code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}
