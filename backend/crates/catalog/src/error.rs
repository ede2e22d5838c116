//! Catalog Error Types
//!
//! This module provides catalog-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use auth::Denial;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, fields::FieldErrors, kind::ErrorKind};
use thiserror::Error;

/// Catalog-specific result type alias
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Message attached to the `title` field on a second review
pub const DUPLICATE_REVIEW_MESSAGE: &str = "You have already reviewed this title.";

/// Catalog-specific error variants
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Rejected input, keyed by field
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Lookup target does not exist (the label names the entity)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The author already reviewed this title
    #[error("{DUPLICATE_REVIEW_MESSAGE}")]
    DuplicateReview,

    /// Anonymous caller on a write endpoint
    #[error("Authentication credentials were not provided")]
    AuthenticationRequired,

    /// Authenticated but not allowed
    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Single-field validation error
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        CatalogError::Validation(FieldErrors::single(field, message))
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation(_) | CatalogError::DuplicateReview => ErrorKind::BadRequest,
            CatalogError::NotFound(_) => ErrorKind::NotFound,
            CatalogError::AuthenticationRequired => ErrorKind::Unauthorized,
            CatalogError::PermissionDenied => ErrorKind::Forbidden,
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            CatalogError::Validation(fields) => AppError::validation(fields.clone()),
            CatalogError::DuplicateReview => {
                AppError::validation(FieldErrors::single("title", DUPLICATE_REVIEW_MESSAGE))
            }
            CatalogError::Database(_) | CatalogError::Internal(_) => {
                AppError::internal("Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            CatalogError::Database(e) => {
                tracing::error!(error = %e, "Catalog database error");
            }
            CatalogError::Internal(msg) => {
                tracing::error!(message = %msg, "Catalog internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<Denial> for CatalogError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::AuthenticationRequired => CatalogError::AuthenticationRequired,
            Denial::PermissionDenied => CatalogError::PermissionDenied,
        }
    }
}

impl From<FieldErrors> for CatalogError {
    fn from(fields: FieldErrors) -> Self {
        CatalogError::Validation(fields)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        err.log();
        err.to_app_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(CatalogError::field("slug", "x").kind(), ErrorKind::BadRequest);
        assert_eq!(CatalogError::DuplicateReview.kind(), ErrorKind::BadRequest);
        assert_eq!(CatalogError::NotFound("Title").kind(), ErrorKind::NotFound);
        assert_eq!(CatalogError::AuthenticationRequired.kind(), ErrorKind::Unauthorized);
        assert_eq!(CatalogError::PermissionDenied.kind(), ErrorKind::Forbidden);
        assert_eq!(
            CatalogError::Internal("x".into()).kind(),
            ErrorKind::InternalServerError
        );
    }

    #[test]
    fn test_duplicate_review_names_title_field() {
        let app = CatalogError::DuplicateReview.to_app_error();
        assert_eq!(app.status_code(), 400);
        assert_eq!(
            app.field_errors().get("title").unwrap(),
            [DUPLICATE_REVIEW_MESSAGE.to_string()]
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(CatalogError::NotFound("Review").to_string(), "Review not found");
    }

    #[test]
    fn test_denial_mapping() {
        assert!(matches!(
            CatalogError::from(Denial::AuthenticationRequired),
            CatalogError::AuthenticationRequired
        ));
        assert!(matches!(
            CatalogError::from(Denial::PermissionDenied),
            CatalogError::PermissionDenied
        ));
    }

    #[test]
    fn test_internal_message_is_hidden() {
        let app = CatalogError::Internal("secret detail".into()).to_app_error();
        assert_eq!(app.message(), "Internal server error");
    }
}
