//! Session manager.
//!
//! Tracks the logged-in identity of one caller across requests. The session
//! itself is a `tower_sessions::Session` attached by the session layer.

use tower_sessions::Session;

use crate::models::session::{CurrentUser, Identity, keys};
use crate::models::user::User;

/// Login state for a single caller.
#[derive(Debug, Clone)]
pub struct SessionManager {
    session: Session,
}

impl SessionManager {
    /// Wrap the caller's session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Record `user` as the caller's identity.
    ///
    /// The session ID is cycled first so an ID issued before login can't be
    /// used to ride the authenticated session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store rejects the change.
    pub async fn start(&self, user: &User) -> Result<CurrentUser, tower_sessions::session::Error> {
        let current = CurrentUser::from(user);

        self.session.cycle_id().await?;
        self.session.insert(keys::CURRENT_USER, &current).await?;

        tracing::info!(user_id = %user.id, "session started");
        Ok(current)
    }

    /// Forget the caller's identity and delete the session record.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store can't delete the record.
    pub async fn end(&self) -> Result<(), tower_sessions::session::Error> {
        self.session.flush().await
    }

    /// The caller's identity.
    ///
    /// A store failure is logged and read as [`Identity::Anonymous`].
    pub async fn current(&self) -> Identity {
        match self.session.get::<CurrentUser>(keys::CURRENT_USER).await {
            Ok(Some(user)) => Identity::Authenticated(user),
            Ok(None) => Identity::Anonymous,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session, treating caller as anonymous");
                Identity::Anonymous
            }
        }
    }
}
