//! Error taxonomy shared by every layer, and its HTTP representation.
//!
//! Errors form a closed set of four kinds. Each propagation boundary matches
//! on [`AppError::kind`] exhaustively instead of inspecting messages:
//!
//! | Kind | Raised by | HTTP status |
//! |------|-----------|-------------|
//! | [`ErrorKind::AlreadyExists`] | store create-if-absent collision | 500 |
//! | [`ErrorKind::NotFound`] | store update on an absent identifier | 404 |
//! | [`ErrorKind::InvalidInput`] | boundary validation | 400 |
//! | [`ErrorKind::TransientFailure`] | any other store/cache/queue failure | 500 |
//!
//! Collisions are retried inside the resolution service and only surface once
//! every attempt has collided, which is why they map to a server error.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

/// Discriminant of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    InvalidInput,
    TransientFailure,
}

/// Machine-readable error payload embedded in error responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    AlreadyExists { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    InvalidInput { message: String, details: Value },
    #[error("{message}")]
    TransientFailure { message: String, details: Value },
}

impl AppError {
    pub fn already_exists(message: impl Into<String>, details: Value) -> Self {
        Self::AlreadyExists {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn invalid_input(message: impl Into<String>, details: Value) -> Self {
        Self::InvalidInput {
            message: message.into(),
            details,
        }
    }

    pub fn transient(message: impl Into<String>, details: Value) -> Self {
        Self::TransientFailure {
            message: message.into(),
            details,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::InvalidInput { .. } => ErrorKind::InvalidInput,
            AppError::TransientFailure { .. } => ErrorKind::TransientFailure,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::AlreadyExists | ErrorKind::TransientFailure => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Wraps the message with the context of the operation that failed,
    /// keeping the kind and details intact.
    pub fn context(self, context: impl std::fmt::Display) -> Self {
        match self {
            AppError::AlreadyExists { message, details } => AppError::AlreadyExists {
                message: format!("{context}: {message}"),
                details,
            },
            AppError::NotFound { message, details } => AppError::NotFound {
                message: format!("{context}: {message}"),
                details,
            },
            AppError::InvalidInput { message, details } => AppError::InvalidInput {
                message: format!("{context}: {message}"),
                details,
            },
            AppError::TransientFailure { message, details } => AppError::TransientFailure {
                message: format!("{context}: {message}"),
                details,
            },
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        let (code, message, details) = match self {
            AppError::AlreadyExists { message, details } => ("already_exists", message, details),
            AppError::NotFound { message, details } => ("not_found", message, details),
            AppError::InvalidInput { message, details } => ("invalid_input", message, details),
            AppError::TransientFailure { message, details } => {
                ("internal_error", message, details)
            }
        };

        ErrorInfo {
            code,
            message: message.clone(),
            details: details.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self.kind() {
            ErrorKind::InvalidInput | ErrorKind::NotFound => {
                tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
            }
            ErrorKind::AlreadyExists | ErrorKind::TransientFailure => {
                tracing::error!(status = status.as_u16(), error = %self, "Request failed");
            }
        }

        let body = ErrorBody {
            error: self.to_error_info(),
            timestamp: Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::already_exists(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        AppError::transient("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        let fields: Vec<String> = e.field_errors().keys().map(|k| k.to_string()).collect();
        AppError::invalid_input(
            "Request validation failed",
            json!({ "fields": fields, "reason": e.to_string() }),
        )
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::invalid_input(
            "Request body is not valid JSON",
            json!({ "status": e.status().as_u16(), "reason": e.body_text() }),
        )
    }
}
