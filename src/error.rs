use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analytics::AnalyticsError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl AppError {
    /// Maps a UNIQUE constraint failure to a 409 carrying `message`.
    pub fn on_conflict(self, message: &str) -> Self {
        let duplicate = matches!(
            &self,
            AppError::Database(e) if e.to_string().contains("UNIQUE constraint failed")
        );
        if duplicate {
            AppError::Conflict(message.to_string())
        } else {
            self
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::ExternalService(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Storage(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Analytics(err @ AnalyticsError::InvalidWindow { .. })
            | AppError::Analytics(err @ AnalyticsError::YearOutOfRange(_)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            // Bad order data upstream; keep the detail in the logs only.
            AppError::Analytics(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Analytics unavailable".to_string(),
            ),
        };

        tracing::error!("Error response: {} - {}", status, self);

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
