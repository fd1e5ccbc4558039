use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    /// Startup-fatal: duplicate registration or a resource pointing at missing content.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Startup-fatal: a content source could not be read.
    #[error("Failed to load content '{key}': {reason}")]
    ContentLoadError { key: String, reason: String },

    #[error("Invalid input for '{field}': {reason}")]
    ValidationError { field: String, reason: String },

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Feedback was not recorded: {0}")]
    StorageError(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Short label used in metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ConfigurationError(_) => "configuration",
            AppError::ContentLoadError { .. } => "content_load",
            AppError::ValidationError { .. } => "validation",
            AppError::NotFoundError(_) => "not_found",
            AppError::StorageError(_) => "storage",
        }
    }

    /// JSON-RPC error code reported to the host runtime.
    pub fn rpc_code(&self) -> i64 {
        match self {
            AppError::ValidationError { .. } => crate::protocol::INVALID_PARAMS,
            AppError::NotFoundError(_) => crate::protocol::RESOURCE_NOT_FOUND,
            _ => crate::protocol::INTERNAL_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ValidationError { field, reason } => {
                tracing::warn!(field = %field, reason = %reason, "Validation error");
                StatusCode::BAD_REQUEST
            }
            AppError::NotFoundError(what) => {
                tracing::warn!(what = %what, "Not found");
                StatusCode::NOT_FOUND
            }
            AppError::StorageError(e) => {
                tracing::error!(error = %e, "Storage error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ConfigurationError(_) | AppError::ContentLoadError { .. } => {
                tracing::error!(error = %self, "Startup error surfaced at request time");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
