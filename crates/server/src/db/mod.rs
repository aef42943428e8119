//! Persistence for the cafe directory.
//!
//! # Database schema: `directory`
//!
//! ## Tables
//!
//! - `users` - Accounts (unique `email`, at most one `admin` role)
//! - `cafes` - Cafe listings (unique canonical `name`)
//!
//! Sessions live in the `tower_sessions` schema owned by the session store.
//!
//! # Uniqueness
//!
//! Uniqueness of emails and cafe names is enforced by database constraints,
//! never by a lookup followed by an insert. A violating write comes back as
//! [`RepositoryError::Conflict`] carrying the constraint name, and the
//! services translate that into their own typed errors.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p cafe-finder-cli -- migrate
//! ```

pub mod cafes;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod users;

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use thiserror::Error;

pub use cafes::{CafeRepository, PgCafeRepository};
pub use users::{PgUserRepository, UserRepository};

/// Unique constraint on `directory.users.email`.
pub const USERS_EMAIL_KEY: &str = "users_email_key";

/// Partial unique index allowing a single `admin` row in `directory.users`.
pub const USERS_SINGLE_ADMIN_IDX: &str = "users_single_admin_idx";

/// Unique constraint on `directory.cafes.name`.
pub const CAFES_NAME_KEY: &str = "cafes_name_key";

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation; carries the constraint name.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Whether this error is a violation of the named constraint.
    #[must_use]
    pub fn is_conflict_on(&self, constraint: &str) -> bool {
        matches!(self, Self::Conflict(name) if name == constraint)
    }
}

/// Translate a unique violation into [`RepositoryError::Conflict`].
///
/// Every other sqlx error stays an opaque [`RepositoryError::Database`].
pub(crate) fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let constraint = db_err.constraint().unwrap_or("unknown").to_owned();
        return RepositoryError::Conflict(constraint);
    }
    RepositoryError::Database(e)
}

/// A backing store for both relations.
///
/// Services receive their repository handles from a `Storage`, which keeps
/// the production wiring (`PgStorage`) and the in-memory test wiring
/// interchangeable.
pub trait Storage: Send + Sync + 'static {
    /// Account persistence.
    type Users: UserRepository;
    /// Cafe persistence.
    type Cafes: CafeRepository;

    /// A handle to the users relation.
    fn users(&self) -> Self::Users;

    /// A handle to the cafes relation.
    fn cafes(&self) -> Self::Cafes;

    /// Check that the store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// `PostgreSQL`-backed storage.
#[derive(Debug, Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Storage for PgStorage {
    type Users = PgUserRepository;
    type Cafes = PgCafeRepository;

    fn users(&self) -> Self::Users {
        PgUserRepository::new(self.pool.clone())
    }

    fn cafes(&self) -> Self::Cafes {
        PgCafeRepository::new(self.pool.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// Every connection carries a server-side `statement_timeout`, so no query
/// can block a request indefinitely.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `statement_timeout` - Upper bound for a single statement
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be established.
pub async fn create_pool(
    database_url: &SecretString,
    statement_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    let options = PgConnectOptions::from_str(database_url.expose_secret())?
        .options([("statement_timeout", statement_timeout.as_millis().to_string())]);

    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
