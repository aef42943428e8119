//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, signed cookie)
//!
//! Authentication is not a layer: handlers state their requirement with an
//! extractor from [`auth`].

pub mod auth;
pub mod session;

pub use auth::{CurrentIdentity, RequireAuth, RequirePrivileged};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, signing_key};
