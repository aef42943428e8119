//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures infrastructure errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AccessError, AccountError, CafeError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account operation failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Registry operation failed.
    #[error("Cafe error: {0}")]
    Cafe(#[from] CafeError),

    /// Access check failed.
    #[error("Access error: {0}")]
    Access(#[from] AccessError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this is a server-side failure rather than a caller mistake.
    fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Session(_)
                | Self::Database(_)
                | Self::Internal(_)
                | Self::Account(AccountError::Repository(_) | AccountError::PasswordHash)
                | Self::Cafe(CafeError::Repository(_))
        )
    }

    fn status(&self) -> StatusCode {
        if self.is_infrastructure() {
            return StatusCode::INTERNAL_SERVER_ERROR;
        }

        match self {
            Self::Account(err) => match err {
                AccountError::DuplicateEmail => StatusCode::CONFLICT,
                AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Cafe(err) => match err {
                CafeError::Conflict(_) => StatusCode::CONFLICT,
                CafeError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::BAD_REQUEST,
            },
            Self::Access(AccessError::Unauthenticated) => StatusCode::UNAUTHORIZED,
            Self::Access(AccessError::Forbidden) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Never includes internal details.
    fn public_message(&self) -> String {
        if self.is_infrastructure() {
            return "Internal server error".to_string();
        }

        match self {
            Self::Account(err) => match err {
                AccountError::DuplicateEmail => {
                    "This email already exists in our database. Please login".to_string()
                }
                AccountError::InvalidCredentials => "Invalid email or password".to_string(),
                AccountError::InvalidEmail(e) => format!("Invalid email address: {e}"),
                AccountError::WeakPassword(msg) | AccountError::InvalidName(msg) => msg.clone(),
                _ => "Internal server error".to_string(),
            },
            Self::Cafe(err) => match err {
                CafeError::Conflict(name) => format!(
                    "{name} cafe already exists. If it's a different location, try to add a \
                     location after the cafe name. e.g. {name} Kingsway"
                ),
                CafeError::NotFound(id) => format!("Cafe {id} not found"),
                CafeError::InvalidName(e) => format!("Invalid cafe name: {e}"),
                CafeError::InvalidField { field, reason } => format!("{field} {reason}"),
                CafeError::Repository(_) => "Internal server error".to_string(),
            },
            Self::Access(AccessError::Unauthenticated) => "Login required".to_string(),
            Self::Access(AccessError::Forbidden) => {
                "Only the site administrator can delete cafes".to_string()
            }
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_infrastructure() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = Json(json!({ "error": self.public_message() }));

        (status, body).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cafe_finder_core::{CafeId, CafeName};

    use super::*;

    fn status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status(AccountError::DuplicateEmail), StatusCode::CONFLICT);
        assert_eq!(
            status(AccountError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status(AccountError::WeakPassword("short".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AccessError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status(AccessError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(
            status(CafeError::NotFound(CafeId::new(4))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(AppError::Internal("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AccountError::Repository(RepositoryError::NotFound)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_conflict_message_names_the_cafe() {
        let name = CafeName::parse("bean there").unwrap();
        let message = AppError::from(CafeError::Conflict(name)).public_message();
        assert!(message.starts_with("Bean There cafe already exists."));
        assert!(message.ends_with("e.g. Bean There Kingsway"));
    }

    #[test]
    fn test_infrastructure_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "users row 7 has role 'root'".to_string(),
        ));
        assert_eq!(err.public_message(), "Internal server error");
    }
}
