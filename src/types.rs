// Request-level error type shared by the coordinator and the HTTP layer

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::db::CatalogError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No authenticated session")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload failed: {0}")]
    Upload(#[source] StorageError),

    #[error("Storage error: {0}")]
    Storage(#[source] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Timed out: {0}")]
    Timeout(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::DuplicateUsername => Self::DuplicateUsername,
            CatalogError::Database(e) => Self::Database(e),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => Self::NotFound(format!("blob '{}'", name)),
            StorageError::InvalidName(name) => {
                Self::InvalidRequest(format!("invalid blob name '{}'", name))
            }
            StorageError::Timeout(_) => Self::Timeout("content store"),
            other => Self::Storage(other),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            Self::DuplicateUsername => (StatusCode::CONFLICT, "DUPLICATE_USERNAME"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::InvalidRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST"),
            Self::Upload(_) => (StatusCode::INTERNAL_SERVER_ERROR, "UPLOAD_FAILED"),
            Self::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            Self::Storage(_) | Self::Database(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Backing-store detail stays in the logs.
        let message = match &self {
            Self::Upload(_) => "The upload could not be stored".to_string(),
            Self::Timeout(_) => "The request timed out".to_string(),
            Self::Storage(_) | Self::Database(_) | Self::Internal(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        }

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}
