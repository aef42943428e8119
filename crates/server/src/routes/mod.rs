//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health            - Liveness
//! GET    /health/ready      - Readiness (storage ping)
//!
//! # Auth
//! POST   /auth/register     - Create an account and log in
//! POST   /auth/login        - Log in
//! POST   /auth/logout       - Log out (requires auth)
//! GET    /auth/me           - Current identity
//!
//! # Cafes
//! GET    /cafes             - List cafes
//! POST   /cafes             - Add a cafe (requires auth)
//! GET    /cafes/{id}        - Show a cafe
//! PUT    /cafes/{id}        - Replace a cafe (requires auth)
//! DELETE /cafes/{id}        - Delete a cafe (administrator only)
//! ```

pub mod auth;
pub mod cafes;
pub mod health;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use crate::db::Storage;
use crate::middleware::create_session_layer;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes<S: Storage>() -> Router<AppState<S>> {
    Router::new()
        .route("/register", post(auth::register::<S>))
        .route("/login", post(auth::login::<S>))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the cafe routes router.
pub fn cafe_routes<S: Storage>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(cafes::index::<S>).post(cafes::create::<S>))
        .route(
            "/{id}",
            get(cafes::show::<S>)
                .put(cafes::update::<S>)
                .delete(cafes::destroy::<S>),
        )
}

/// Create all routes.
pub fn routes<S: Storage>() -> Router<AppState<S>> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness::<S>))
        .nest("/auth", auth_routes())
        .nest("/cafes", cafe_routes())
}

/// Build the application with its session and trace layers.
///
/// Sentry layers are added by the binary, outermost.
pub fn app<S, Store>(state: AppState<S>, session_store: Store) -> Router
where
    S: Storage,
    Store: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config());

    routes()
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
