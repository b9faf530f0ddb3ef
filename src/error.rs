//! Error types for the catalog server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Login entry point unauthenticated callers are sent to
pub const LOGIN_URL: &str = "/accounts/login/";

/// Stable error codes exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchData = 4,
    BadValue = 5,
    InvalidDate = 6,
    Duplicate = 7,
}

/// Why a proposed renewal date was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRejection {
    /// Proposed date is before today
    Past,
    /// Proposed date is beyond the renewal window
    TooFar,
}

impl DateRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateRejection::Past => "past",
            DateRejection::TooFar => "too far",
        }
    }

    /// User-facing message attached to the renewal date field
    pub fn message(&self) -> &'static str {
        match self {
            DateRejection::Past => "Invalid date - renewal in past",
            DateRejection::TooFar => "Invalid date - renewal more than 4 weeks ahead",
        }
    }
}

impl std::fmt::Display for DateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication required")]
    AuthenticationRequired { next: Option<String> },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid date: {0}")]
    InvalidDate(DateRejection),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn authentication_required() -> Self {
        AppError::AuthenticationRequired { next: None }
    }

    /// Attach the path the caller should come back to after logging in
    pub fn with_next(self, path: impl Into<String>) -> Self {
        match self {
            AppError::AuthenticationRequired { .. } => AppError::AuthenticationRequired {
                next: Some(path.into()),
            },
            other => other,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .into_iter()
            .map(|(field, _)| field.to_string())
            .collect();
        fields.sort();
        AppError::Validation(format!("invalid fields: {}", fields.join(", ")))
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            AppError::AuthenticationRequired { next } => {
                let target = match next {
                    Some(path) => format!("{}?next={}", LOGIN_URL, urlencoding::encode(path)),
                    None => LOGIN_URL.to_string(),
                };
                return Redirect::to(&target).into_response();
            }
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone(), None)
            }
            AppError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, msg.clone(), None)
            }
            AppError::InvalidDate(reason) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidDate,
                reason.message().to_string(),
                Some("renewal_date"),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone(), None)
            }
            AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, msg.clone(), None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            field,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
