//! API error types with JSON responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookshelf_core::{ValidationError, ValidationReport};
use bookshelf_store::StoreError;
use serde::Serialize;

/// API error that can be returned from handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request (400).
    #[error("{0}")]
    BadRequest(String),

    /// Request body failed schema validation (400).
    #[error("Invalid body request")]
    Validation(ValidationReport),

    /// Store error.
    #[error("{0}")]
    Store(#[from] StoreError),
}

impl ApiError {
    /// Get the error code string for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store(e) => match e {
                StoreError::BookNotFound(_)
                | StoreError::AuthorNotFound(_)
                | StoreError::TagNotFound(_) => "NOT_FOUND",
                StoreError::DuplicateBook(_)
                | StoreError::DuplicateTag(_)
                | StoreError::AuthorHasBooks(_) => "CONFLICT",
                StoreError::UnknownAuthor(_) => "BAD_REQUEST",
                _ => "STORAGE_ERROR",
            },
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Store(e) => match e {
                StoreError::BookNotFound(_)
                | StoreError::AuthorNotFound(_)
                | StoreError::TagNotFound(_) => StatusCode::NOT_FOUND,
                StoreError::DuplicateBook(_)
                | StoreError::DuplicateTag(_)
                | StoreError::AuthorHasBooks(_) => StatusCode::CONFLICT,
                StoreError::UnknownAuthor(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Message sent to the client. Database internals are not exposed.
    fn public_message(&self) -> String {
        match self {
            Self::Store(StoreError::Database(_))
            | Self::Store(StoreError::Migration(_))
            | Self::Store(StoreError::Config(_)) => "internal storage error".to_string(),
            other => other.to_string(),
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Top-level human-readable message.
    pub message: String,
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    /// Error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Per-property violations, only present for validation failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let code = self.code().to_string();
        let message = self.public_message();
        let details = match self {
            Self::Validation(report) => report.errors,
            _ => Vec::new(),
        };
        let body = ErrorResponse {
            message: message.clone(),
            error: ErrorDetails {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
