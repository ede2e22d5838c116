//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, fields::FieldErrors, kind::ErrorKind};
use platform::mail::MailError;
use thiserror::Error;

use crate::domain::policy::Denial;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Rejected input, keyed by field
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Anonymous caller on a protected endpoint
    #[error("Authentication credentials were not provided")]
    AuthenticationRequired,

    /// Bearer token is malformed, expired, or names an unusable account
    #[error("Token is invalid or expired")]
    InvalidToken,

    /// Authenticated but not allowed
    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    /// Confirmation email could not be delivered
    #[error("Email delivery failed: {0}")]
    Mail(#[from] MailError),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Single-field validation error
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        AuthError::Validation(FieldErrors::single(field, message))
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::AuthenticationRequired | AuthError::InvalidToken => {
                ErrorKind::Unauthorized
            }
            AuthError::PermissionDenied => ErrorKind::Forbidden,
            AuthError::Mail(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(fields) => AppError::validation(fields.clone()),
            AuthError::Mail(_) => AppError::service_unavailable("Confirmation email could not be sent")
                .with_action("Try again later"),
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Mail(e) => {
                tracing::error!(error = %e, "Confirmation email delivery failed");
            }
            AuthError::InvalidToken => {
                tracing::warn!("Rejected bearer token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<Denial> for AuthError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::AuthenticationRequired => AuthError::AuthenticationRequired,
            Denial::PermissionDenied => AuthError::PermissionDenied,
        }
    }
}

impl From<FieldErrors> for AuthError {
    fn from(fields: FieldErrors) -> Self {
        AuthError::Validation(fields)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.log();
        err.to_app_error()
    }
}
