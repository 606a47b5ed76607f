//! Application error type shared by the engine, the stores and the HTTP layer.
//!
//! Every failure path produces a tagged [`AppError`] variant so callers can
//! tell validation problems, missing tokens, pagination range errors and
//! storage failures apart. The HTTP layer renders them through
//! [`IntoResponse`] as:
//!
//! ```json
//! { "error": { "code": "not_found", "message": "URL not found", "details": { "token": "abc123" } } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required input was absent or empty.
    #[error("Missing '{field}' field in request body")]
    MissingField { field: &'static str },

    /// An input had the wrong JSON type.
    #[error("'{field}' must be a {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Invalid URL format")]
    InvalidUrlFormat { reason: String },

    /// No usable short token could be produced for a long URL.
    #[error("Failed to generate short URL, please try again")]
    GenerationFailure { reason: String },

    #[error("URL not found")]
    NotFound { token: String },

    #[error("{message}")]
    InvalidPagination { message: String },

    #[error("Page {page} exceeds total pages {total_pages}.")]
    PageOutOfRange { page: i64, total_pages: i64 },

    /// A unique constraint rejected a write.
    #[error("Unique constraint violation")]
    Conflict { constraint: Option<String> },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(token: impl Into<String>) -> Self {
        Self::NotFound {
            token: token.into(),
        }
    }

    pub fn invalid_pagination(message: impl Into<String>) -> Self {
        Self::InvalidPagination {
            message: message.into(),
        }
    }

    /// Returns true if this is a unique violation on the named constraint.
    pub fn is_conflict_on(&self, name: &str) -> bool {
        matches!(self, Self::Conflict { constraint: Some(c) } if c == name)
    }

    /// Stable error code used in response bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
            Self::InvalidType { .. } => "invalid_type",
            Self::InvalidUrlFormat { .. } => "invalid_url_format",
            Self::GenerationFailure { .. } => "generation_failure",
            Self::NotFound { .. } => "not_found",
            Self::InvalidPagination { .. } => "invalid_pagination",
            Self::PageOutOfRange { .. } => "page_out_of_range",
            Self::Conflict { .. } => "conflict",
            Self::Internal { .. } => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField { .. }
            | Self::InvalidType { .. }
            | Self::InvalidUrlFormat { .. }
            | Self::InvalidPagination { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } | Self::PageOutOfRange { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::GenerationFailure { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn details(&self) -> Value {
        match self {
            Self::MissingField { field } => json!({ "field": field }),
            Self::InvalidType { field, expected } => {
                json!({ "field": field, "expected": expected })
            }
            Self::InvalidUrlFormat { reason } | Self::GenerationFailure { reason } => {
                json!({ "reason": reason })
            }
            Self::NotFound { token } => json!({ "token": token }),
            Self::InvalidPagination { .. } => json!({}),
            Self::PageOutOfRange { page, total_pages } => {
                json!({ "page": page, "total_pages": total_pages })
            }
            Self::Conflict { constraint } => json!({ "constraint": constraint }),
            Self::Internal { details, .. } => details.clone(),
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::Conflict {
                constraint: db.constraint().map(str::to_string),
            };
        }

        AppError::internal("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        AppError::internal("Migration error", json!({ "reason": e.to_string() }))
    }
}
