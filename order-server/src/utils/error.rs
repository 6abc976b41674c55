//! Unified error handling
//!
//! Application error enum and the API response envelope:
//! success bodies are `{ "message", "data"? }`, failures are
//! `{ "error", "status", "errors"? }`.
//!
//! `Unavailable` is the routine stale-state outcome of a guarded status
//! transition matching zero rows — expected under concurrent use, returned
//! as 400 without an error log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// Successful API response.
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Short human-readable Portuguese message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Field-level validation detail.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Application-level error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Caller Errors (4xx) ==========
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Validation failed")]
    ValidationFields(Vec<FieldError>),

    /// Guarded transition matched zero rows: stale client state,
    /// concurrent modification or out-of-order webhook.
    #[error("Operation unavailable: {0}")]
    Unavailable(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Upstream rejection before any state change (gateway refused).
    #[error("Upstream rejection: {0}")]
    Upstream(String),

    // ========== System Errors (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Failure response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::ValidationFields(fields) => (
                StatusCode::BAD_REQUEST,
                "Dados inválidos".to_string(),
                Some(fields),
            ),
            AppError::Unavailable(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Upstream(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro interno do servidor".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Erro interno do servidor".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorBody {
            error: message,
            status: status.as_u16(),
            errors,
        });

        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// The standard stale-state message for a CAS miss.
    pub fn stale() -> Self {
        Self::Unavailable("Ação não está mais disponível".to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Registro não encontrado".into()),
            other => AppError::Database(other.to_string()),
        }
    }
}

// ========== Helper functions ==========

/// Success response with a message only.
pub fn ok(message: impl Into<String>) -> Json<AppResponse<()>> {
    Json(AppResponse {
        message: message.into(),
        data: None,
    })
}

/// Success response carrying data.
pub fn ok_with<T: Serialize>(message: impl Into<String>, data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        message: message.into(),
        data: Some(data),
    })
}
