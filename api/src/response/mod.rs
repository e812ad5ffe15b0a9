//! Error responses for the HTTP layer.
//!
//! Successful handlers return their payload as plain camelCase JSON. Every
//! failure goes through [`ApiError`], which renders as:
//!
//! ```json
//! { "error": "QR code has expired" }
//! ```

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::attendance::AttendanceError;
use serde::Serialize;
use tracing::{error, warn};

/// Classes of failure a client can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    Forbidden,
    NotFound,
    Expired,
    Internal,
}

impl ErrorCode {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Validation => StatusCode::BAD_REQUEST,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Expired => StatusCode::GONE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, message)
    }

    /// Maps a domain failure onto a response; database errors are logged here
    /// and replaced with `fallback` so no internals reach the client.
    pub fn from_attendance(err: AttendanceError, fallback: &str) -> Self {
        match err {
            AttendanceError::InvalidToken | AttendanceError::SessionNotFound => {
                Self::not_found(err.to_string())
            }
            AttendanceError::Expired => Self::new(ErrorCode::Expired, err.to_string()),
            AttendanceError::NotEnrolled => Self::new(ErrorCode::Forbidden, err.to_string()),
            AttendanceError::Invalid(msg) => Self::validation(msg),
            AttendanceError::Database(e) => {
                error!(error = %e, "{fallback}");
                Self::internal(fallback)
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(reason = %rejection.body_text(), "Rejected request body");
        Self::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
        };
        (self.code.status_code(), Json(body)).into_response()
    }
}
