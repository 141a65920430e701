use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

use crate::{response::Envelope, storage::StorageError};

pub const BIND_REQUEST: &str = "failed to bind request";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    /// The message is logged, never sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                error!(%detail, "internal error");
                "internal server error".to_string()
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => {
                warn!(%status, error = %msg, "request failed");
                msg
            }
        };
        (status, Json(Envelope::error(message))).into_response()
    }
}

/// Wraps any failure that should surface as a 500.
pub fn internal<E: std::fmt::Display>(e: E) -> ApiError {
    ApiError::Internal(e.to_string())
}

/// Unwraps a numeric path parameter, rejecting non-positive ids.
pub fn path_id(path: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    let Path(id) = path?;
    if id <= 0 {
        warn!(id, "non-positive id in path");
        return Err(ApiError::BadRequest(BIND_REQUEST.into()));
    }
    Ok(id)
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let message = err.to_string();
        match err {
            StorageError::UserNotFound | StorageError::TaskNotFound => ApiError::NotFound(message),
            StorageError::DuplicateUsername | StorageError::ForeignKeyViolation => {
                ApiError::Conflict(message)
            }
            StorageError::Database(_) => ApiError::Internal(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "json body rejected");
        ApiError::BadRequest(BIND_REQUEST.into())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        warn!(error = %rejection.body_text(), "path parameter rejected");
        ApiError::BadRequest(BIND_REQUEST.into())
    }
}
