//! User repository for database operations.
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate compiles
//! without a live database.

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cafe_finder_core::{Email, Role, UserId};

use super::{RepositoryError, USERS_SINGLE_ADMIN_IDX, map_unique_violation};
use crate::models::user::{NewUser, User};

/// Persistence operations for accounts.
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a new account.
    ///
    /// The first account ever stored gets [`Role::Admin`]; all others get
    /// [`Role::Member`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` naming [`USERS_EMAIL_KEY`](super::USERS_EMAIL_KEY)
    /// if the email is already registered.
    fn create(
        &self,
        new_user: &NewUser,
    ) -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Get a user by their ID.
    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Get a user by their email address (exact match).
    fn get_by_email(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Get a user together with their stored password hash.
    fn get_password_hash(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<Option<(User, String)>, RepositoryError>> + Send;
}

const USER_COLUMNS: &str = "id, email, name, role, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    name: String,
    role: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserWithHashRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = r
            .role
            .parse::<Role>()
            .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;

        Ok(Self {
            id: r.id,
            email,
            name: r.name,
            role,
            created_at: r.created_at,
        })
    }
}

/// `PostgreSQL` implementation of [`UserRepository`].
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, new_user: &NewUser, role_sql: &str) -> Result<User, RepositoryError> {
        let sql = format!(
            r#"
            INSERT INTO directory.users (email, password_hash, name, role)
            VALUES ($1, $2, $3, {role_sql})
            RETURNING {USER_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        User::try_from(row)
    }
}

/// Role expression for an insert that makes the first account the admin.
const FIRST_ACCOUNT_IS_ADMIN: &str =
    "CASE WHEN EXISTS (SELECT 1 FROM directory.users) THEN 'member' ELSE 'admin' END";

/// Role expression for an insert that never claims the admin role.
const MEMBER_ONLY: &str = "'member'";

impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        match self.insert(new_user, FIRST_ACCOUNT_IS_ADMIN).await {
            // Two first registrations raced and both saw an empty table; the
            // single-admin index let exactly one through.
            Err(e) if e.is_conflict_on(USERS_SINGLE_ADMIN_IDX) => {
                tracing::info!("admin role already claimed, registering as member");
                self.insert(new_user, MEMBER_ONLY).await
            }
            other => other,
        }
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM directory.users WHERE id = $1");

        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM directory.users WHERE email = $1");

        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, password_hash FROM directory.users WHERE email = $1"
        );

        let Some(r) = sqlx::query_as::<_, UserWithHashRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some((User::try_from(r.user)?, r.password_hash)))
    }
}
