//! Unlock Error Types
//!
//! Unlock-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

pub type UnlockResult<T> = Result<T, UnlockError>;

/// Message shown to a visitor after a wrong code
pub const INVALID_CODE_MESSAGE: &str = "Invalid code. Please check again.";

#[derive(Debug, Error)]
pub enum UnlockError {
    /// Submitted code does not match; the visitor may retry
    #[error("Invalid code")]
    InvalidCode,

    /// Stored unlock data cannot be interpreted for its method
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Resource not found")]
    ResourceNotFound,

    #[error("Creator not found")]
    CreatorNotFound,

    #[error("Unlock session not found")]
    SessionNotFound,

    #[error("Unlock session belongs to another client")]
    SessionFingerprintMismatch,

    /// Operation does not apply to this unlock method or session state
    #[error("Unsupported action: {0}")]
    UnsupportedAction(&'static str),

    /// Access was requested before the requirement was satisfied
    #[error("Unlock requirement not met")]
    RequirementNotMet,

    /// Storage or another external service failed
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    #[error("Authentication required")]
    Unauthorized,

    /// Invalid creator input
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UnlockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UnlockError::InvalidCode | UnlockError::DataIntegrity(_) => {
                ErrorKind::UnprocessableEntity
            }
            UnlockError::ResourceNotFound
            | UnlockError::CreatorNotFound
            | UnlockError::SessionNotFound => ErrorKind::NotFound,
            UnlockError::SessionFingerprintMismatch | UnlockError::Unauthorized => {
                ErrorKind::Unauthorized
            }
            UnlockError::UnsupportedAction(_) | UnlockError::RequirementNotMet => {
                ErrorKind::Conflict
            }
            UnlockError::CollaboratorUnavailable(_) => ErrorKind::ServiceUnavailable,
            UnlockError::Validation(_) | UnlockError::MissingHeader(_) => ErrorKind::BadRequest,
            UnlockError::Database(_) | UnlockError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    fn log(&self) {
        match self {
            UnlockError::Database(e) => {
                tracing::error!(error = %e, "Unlock database error");
            }
            UnlockError::Internal(msg) => {
                tracing::error!(message = %msg, "Unlock internal error");
            }
            UnlockError::DataIntegrity(detail) => {
                tracing::error!(detail = %detail, "Unlock requirement failed integrity check");
            }
            UnlockError::CollaboratorUnavailable(detail) => {
                tracing::warn!(detail = %detail, "Unlock collaborator unavailable");
            }
            UnlockError::SessionFingerprintMismatch => {
                tracing::warn!("Unlock session used by a different client");
            }
            _ => {
                tracing::debug!(error = %self, "Unlock error");
            }
        }
    }
}

impl From<UnlockError> for AppError {
    fn from(err: UnlockError) -> Self {
        match err {
            UnlockError::InvalidCode => AppError::unprocessable(INVALID_CODE_MESSAGE)
                .with_action("Re-enter the code shared by the creator"),
            UnlockError::DataIntegrity(_) => {
                AppError::unprocessable("This resource is misconfigured and cannot be unlocked")
            }
            UnlockError::ResourceNotFound => AppError::not_found("Resource not found"),
            UnlockError::CreatorNotFound => AppError::not_found("Creator not found"),
            UnlockError::SessionNotFound => AppError::not_found("Unlock session not found")
                .with_action("Reload the unlock page"),
            UnlockError::SessionFingerprintMismatch => {
                AppError::unauthorized("Unlock session belongs to another client")
            }
            UnlockError::UnsupportedAction(what) => AppError::conflict(what),
            UnlockError::RequirementNotMet => AppError::conflict("Unlock requirement not met"),
            UnlockError::CollaboratorUnavailable(_) => {
                AppError::service_unavailable("Download link could not be prepared")
                    .with_action("Try again in a moment")
            }
            UnlockError::Unauthorized => AppError::unauthorized("Authentication required"),
            UnlockError::Validation(msg) => AppError::bad_request(msg),
            UnlockError::MissingHeader(header) => {
                AppError::bad_request(format!("Missing required header: {}", header))
            }
            UnlockError::Database(e) => AppError::from(e),
            UnlockError::Internal(_) => AppError::internal("Internal error"),
        }
    }
}

impl IntoResponse for UnlockError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}

impl From<platform::visitor::VisitorError> for UnlockError {
    fn from(err: platform::visitor::VisitorError) -> Self {
        match err {
            platform::visitor::VisitorError::MissingHeader(header) => {
                UnlockError::MissingHeader(header)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(UnlockError::InvalidCode.kind(), ErrorKind::UnprocessableEntity);
        assert_eq!(
            UnlockError::DataIntegrity("x".into()).kind(),
            ErrorKind::UnprocessableEntity
        );
        assert_eq!(UnlockError::ResourceNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(
            UnlockError::CollaboratorUnavailable("x".into()).kind(),
            ErrorKind::ServiceUnavailable
        );
        assert_eq!(UnlockError::RequirementNotMet.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_app_error_kind_matches() {
        let errors = vec![
            UnlockError::InvalidCode,
            UnlockError::DataIntegrity("x".into()),
            UnlockError::ResourceNotFound,
            UnlockError::CreatorNotFound,
            UnlockError::SessionNotFound,
            UnlockError::SessionFingerprintMismatch,
            UnlockError::UnsupportedAction("x"),
            UnlockError::RequirementNotMet,
            UnlockError::CollaboratorUnavailable("x".into()),
            UnlockError::Unauthorized,
            UnlockError::Validation("x".into()),
            UnlockError::MissingHeader("User-Agent"),
            UnlockError::Internal("x".into()),
        ];
        for err in errors {
            let kind = err.kind();
            assert_eq!(AppError::from(err).kind(), kind);
        }
    }

    #[test]
    fn test_app_error_messages_do_not_leak_detail() {
        let app: AppError = UnlockError::DataIntegrity("delay 'abc' is not a number".into()).into();
        assert!(!app.message().contains("abc"));

        let app: AppError = UnlockError::Internal("lock poisoned".into()).into();
        assert_eq!(app.message(), "Internal error");

        let app: AppError = UnlockError::InvalidCode.into();
        assert_eq!(app.message(), INVALID_CODE_MESSAGE);
        assert_eq!(app.status_code(), 422);
    }
}
