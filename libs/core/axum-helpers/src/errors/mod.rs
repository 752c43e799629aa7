pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

/// Body of every error response.
///
/// ```json
/// {
///   "code": 1001,
///   "error": "VALIDATION_ERROR",
///   "message": "name must not be empty; price must be a number",
///   "details": { "violations": ["name must not be empty", "price must be a number"] }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Structured details such as validation violations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type that renders as an [`ErrorResponse`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    /// One or more input rules were violated
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        violations: Vec<String>,
    },

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

}

impl AppError {
    /// Validation failure with the individual rule messages in `details.violations`.
    pub fn validation(violations: Vec<String>) -> Self {
        Self::Validation {
            message: violations.join("; "),
            violations,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error_code = ErrorCode::JsonExtraction.code(), "JSON extraction error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::JsonExtraction, e.body_text()),
                )
            }
            AppError::QueryExtractorRejection(e) => {
                tracing::warn!(error_code = ErrorCode::InvalidQuery.code(), "Query extraction error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::InvalidQuery, e.body_text()),
                )
            }
            AppError::Validation {
                message,
                violations,
            } => {
                tracing::info!(error_code = ErrorCode::ValidationError.code(), "Validation error: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::ValidationError, message)
                        .with_details(json!({ "violations": violations })),
                )
            }
            AppError::InvalidId(raw) => {
                tracing::info!(error_code = ErrorCode::InvalidId.code(), "Invalid id: {}", raw);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::InvalidId, format!("Invalid id: {raw}")),
                )
            }
            AppError::BadRequest(msg) => {
                tracing::info!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(ErrorCode::BadRequest, msg),
                )
            }
            AppError::NotFound(msg) => {
                tracing::info!(error_code = ErrorCode::NotFound.code(), "Not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(ErrorCode::NotFound, msg),
                )
            }
            AppError::Database(e) => map_db_error(&e),
        };

        (status, Json(body)).into_response()
    }
}

/// Maps a store failure to a status and a body that never leaks driver text.
fn map_db_error(error: &DbErr) -> (StatusCode, ErrorResponse) {
    let (status, code) = match error {
        DbErr::RecordNotFound(_) => {
            tracing::info!(error_code = ErrorCode::DatabaseNotFound.code(), "Database record not found: {}", error);
            (StatusCode::NOT_FOUND, ErrorCode::DatabaseNotFound)
        }
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            tracing::error!(error_code = ErrorCode::DatabaseUnavailable.code(), "Database unavailable: {}", error);
            (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::DatabaseUnavailable)
        }
        _ => {
            tracing::error!(error_code = ErrorCode::DatabaseError.code(), "Database error: {}", error);
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError)
        }
    };

    (status, ErrorResponse::new(code, code.default_message()))
}
