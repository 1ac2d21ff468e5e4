use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::allocation::AllocationError;
use crate::ledger::{LedgerError, QueryError};
use crate::models::exam::ExamFormatError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl From<AllocationError> for AppError {
    fn from(e: AllocationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<ExamFormatError> for AppError {
    fn from(e: ExamFormatError) -> Self {
        AppError::Validation(e.to_string())
    }
}

// Extractor rejections would otherwise answer with axum's plain-text bodies.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::NotFound { .. } => AppError::NotFound(e.to_string()),
            QueryError::Ledger(inner) => AppError::Ledger(inner),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Ledger(e) if e.is_parse() => {
                tracing::error!("Ledger parse error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LEDGER_PARSE_ERROR",
                    "The assignment ledger contains a malformed record".to_string(),
                )
            }
            AppError::Ledger(e) => {
                tracing::error!("Ledger error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LEDGER_IO_ERROR",
                    "The assignment ledger could not be accessed".to_string(),
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "RENDER_ERROR",
                    "The seating chart could not be rendered".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
