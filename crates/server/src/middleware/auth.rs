//! Authentication extractors.
//!
//! Handlers declare what they need from the caller's session:
//!
//! - [`SessionManager`] - raw login state, for login and logout
//! - [`CurrentIdentity`] - whoever is calling, anonymous included
//! - [`RequireAuth`] - a logged-in user, or 401
//! - [`RequirePrivileged`] - the administrator, or 403

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, Identity};
use crate::services::{Privileged, SessionManager, require_authenticated, require_privileged};

impl<S> FromRequestParts<S> for SessionManager
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer; missing means the router is misconfigured.
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_owned()))?;

        Ok(Self::new(session))
    }
}

/// Extractor for the caller's identity. Never rejects a request for being
/// anonymous.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CurrentIdentity(identity): CurrentIdentity) -> impl IntoResponse {
///     match identity.user() {
///         Some(user) => format!("Hello, {}!", user.name),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionManager::from_request_parts(parts, state).await?;
        Ok(Self(sessions.current().await))
    }
}

/// Extractor that requires a logged-in user.
///
/// Rejects anonymous callers with 401 Unauthorized.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(parts, state).await?;
        let user = require_authenticated(&identity)?;
        Ok(Self(user.clone()))
    }
}

/// Extractor that requires the administrator.
///
/// Rejects everyone else, anonymous callers included, with 403 Forbidden.
/// The wrapped [`Privileged`] token is what gated registry calls take.
pub struct RequirePrivileged(pub Privileged);

impl<S> FromRequestParts<S> for RequirePrivileged
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(parts, state).await?;
        Ok(Self(require_privileged(&identity)?))
    }
}
