//! Unified error handling for GameSoc Core

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// When set, 5xx responses carry the internal error text in `details`.
static EXPOSE_INTERNAL_DETAILS: AtomicBool = AtomicBool::new(false);

/// Toggle development-mode error details. Called once at startup.
pub fn set_expose_internal_details(enabled: bool) {
    EXPOSE_INTERNAL_DETAILS.store(enabled, Ordering::Relaxed);
}

fn expose_internal_details() -> bool {
    EXPOSE_INTERNAL_DETAILS.load(Ordering::Relaxed)
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Batch-level email transport failure (connection or credentials).
    /// `hint` is the user-actionable message, `message` the raw transport error.
    #[error("Email connection error: {hint} ({message})")]
    EmailConnection { message: String, hint: String },

    /// A third-party service answered badly or not at all
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Spreadsheet import could not find the name/email columns
    #[error("Could not find name and email columns")]
    ColumnsNotFound { headers: Vec<String> },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone(), None),
            AppError::EmailConnection { message, hint } => {
                tracing::warn!("Email connection error: {}", message);
                (
                    StatusCode::BAD_GATEWAY,
                    hint.clone(),
                    Some(serde_json::Value::String(message.clone())),
                )
            }
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone(), None)
            }
            AppError::ColumnsNotFound { headers } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Could not find name and email columns in the sheet".to_string(),
                Some(serde_json::json!({ "headers": headers })),
            ),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                    expose_internal_details().then(|| serde_json::Value::String(e.to_string())),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                    expose_internal_details().then(|| serde_json::Value::String(e.to_string())),
                )
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

// Conversion from validation errors
impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
