//! Authorization gate.
//!
//! Operations restricted to the administrator take a [`Privileged`] token,
//! which can only be obtained from [`require_privileged`].

use thiserror::Error;

use cafe_finder_core::UserId;

use crate::models::session::{CurrentUser, Identity};

/// Access check failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The operation needs a logged-in caller.
    #[error("login required")]
    Unauthenticated,

    /// The caller is not allowed to perform the operation.
    #[error("forbidden")]
    Forbidden,
}

/// Proof that the caller passed [`require_privileged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privileged {
    user_id: UserId,
}

impl Privileged {
    /// The administrator the check was made for.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Require a logged-in caller.
///
/// # Errors
///
/// Returns `AccessError::Unauthenticated` for an anonymous caller.
pub fn require_authenticated(identity: &Identity) -> Result<&CurrentUser, AccessError> {
    identity.user().ok_or(AccessError::Unauthenticated)
}

/// Require the administrator.
///
/// # Errors
///
/// Returns `AccessError::Forbidden` for anonymous callers and for every
/// account whose role isn't privileged.
pub fn require_privileged(identity: &Identity) -> Result<Privileged, AccessError> {
    match identity {
        Identity::Authenticated(user) if user.role.is_privileged() => Ok(Privileged {
            user_id: user.id,
        }),
        Identity::Authenticated(user) => {
            tracing::info!(user_id = %user.id, "privileged operation denied");
            Err(AccessError::Forbidden)
        }
        Identity::Anonymous => Err(AccessError::Forbidden),
    }
}
