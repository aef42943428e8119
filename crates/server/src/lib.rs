//! Cafe Finder directory library.
//!
//! Accounts, sessions, the administrator gate and the cafe registry, exposed
//! as a library so the binary and the integration tests share one router.
//!
//! # Modules
//!
//! - [`services`] - Password hashing, accounts, sessions, access and the registry
//! - [`db`] - Repositories over `PostgreSQL` (and memory, for tests)
//! - [`routes`] / [`middleware`] - The axum surface

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use config::DirectoryConfig;
pub use error::AppError;
pub use state::AppState;
