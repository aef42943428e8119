//! Business logic services.
//!
//! # Services
//!
//! - `password` - Argon2id hashing and verification
//! - `accounts` - Registration and password authentication
//! - `session` - Per-caller login state
//! - `access` - The administrator gate
//! - `cafes` - The cafe registry

pub mod access;
pub mod accounts;
pub mod cafes;
pub mod password;
pub mod session;

pub use access::{AccessError, Privileged, require_authenticated, require_privileged};
pub use accounts::{AccountError, AccountService};
pub use cafes::{CafeError, CafeRegistry};
pub use password::PasswordHasher;
pub use session::SessionManager;
