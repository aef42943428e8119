//! Authentication route handlers.
//!
//! Registration, login and logout over JSON. A successful registration also
//! logs the new account in; if the session store fails at that step the
//! registration still succeeds, without a session cookie.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::db::Storage;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{CurrentIdentity, RequireAuth};
use crate::models::{Identity, User};
use crate::services::SessionManager;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account and log it in.
pub async fn register<S: Storage>(
    State(state): State<AppState<S>>,
    sessions: SessionManager,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let user = state
        .accounts()
        .register(&body.email, &body.password, &body.name)
        .await?;

    // The account is committed at this point; a session failure only means
    // the caller has to log in separately.
    match sessions.start(&user).await {
        Ok(_) => set_sentry_user(&user.id, Some(user.email.as_str())),
        Err(e) => {
            tracing::error!(
                user_id = %user.id,
                error = %e,
                "registered but session could not be started"
            );
        }
    }

    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password.
pub async fn login<S: Storage>(
    State(state): State<AppState<S>>,
    sessions: SessionManager,
    Json(body): Json<LoginRequest>,
) -> Result<Json<User>> {
    let user = state
        .accounts()
        .authenticate(&body.email, &body.password)
        .await?;

    sessions.start(&user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(user))
}

/// Log out.
pub async fn logout(RequireAuth(user): RequireAuth, sessions: SessionManager) -> Result<StatusCode> {
    sessions.end().await?;
    clear_sentry_user();

    tracing::info!(user_id = %user.id, "session ended");
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's identity, anonymous included.
pub async fn me(CurrentIdentity(identity): CurrentIdentity) -> Json<Identity> {
    Json(identity)
}
