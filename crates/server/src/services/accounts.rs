//! Account service.
//!
//! Registration, lookup and password authentication.

use thiserror::Error;

use cafe_finder_core::{Email, EmailError, UserId};

use super::password::PasswordHasher;
use crate::db::{RepositoryError, USERS_EMAIL_KEY, UserRepository};
use crate::models::user::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum display name length.
const MAX_NAME_LENGTH: usize = 100;

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Display name empty or too long.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// An account with this email already exists.
    #[error("email already registered")]
    DuplicateEmail,

    /// Unknown email or wrong password. Callers can't tell which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Account service.
///
/// Owns its repository handle; cheap to clone when the repository is.
#[derive(Debug, Clone)]
pub struct AccountService<R> {
    users: R,
    hasher: PasswordHasher,
}

impl<R: UserRepository> AccountService<R> {
    /// Create a new account service.
    #[must_use]
    pub const fn new(users: R, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Register a new account.
    ///
    /// The email is stored exactly as given. The first account ever
    /// registered becomes the administrator.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidEmail` if the email format is invalid.
    /// Returns `AccountError::WeakPassword` if the password is too short.
    /// Returns `AccountError::InvalidName` if the name is blank or too long.
    /// Returns `AccountError::DuplicateEmail` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, AccountError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let name = validate_name(name)?;

        let password_hash = self
            .hasher
            .hash(password)
            .map_err(|_| AccountError::PasswordHash)?;

        let new_user = NewUser {
            email,
            password_hash,
            name,
        };

        let user = self.users.create(&new_user).await.map_err(|e| {
            if e.is_conflict_on(USERS_EMAIL_KEY) {
                tracing::info!(email = %new_user.email, "registration rejected: email taken");
                AccountError::DuplicateEmail
            } else {
                AccountError::Repository(e)
            }
        })?;

        tracing::info!(user_id = %user.id, role = %user.role, "account registered");
        Ok(user)
    }

    /// Look up an account by email (exact match).
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the database operation fails.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, AccountError> {
        Ok(self.users.get_by_email(email).await?)
    }

    /// Look up an account by ID.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::Repository` if the database operation fails.
    pub async fn get(&self, id: UserId) -> Result<Option<User>, AccountError> {
        Ok(self.users.get_by_id(id).await?)
    }

    /// Check an email and password.
    ///
    /// An unknown email still pays for one Argon2 computation so both
    /// failure paths take the same time.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidCredentials` if the email is unknown or
    /// the password is wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let Ok(email) = Email::parse(email) else {
            tracing::debug!("login rejected: malformed email");
            self.burn_hash(password);
            return Err(AccountError::InvalidCredentials);
        };

        let Some((user, password_hash)) = self.users.get_password_hash(&email).await? else {
            tracing::info!(%email, "login rejected: unknown email");
            self.burn_hash(password);
            return Err(AccountError::InvalidCredentials);
        };

        if !self.hasher.verify(password, &password_hash) {
            tracing::info!(user_id = %user.id, "login rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(user)
    }

    fn burn_hash(&self, password: &str) {
        let _ = self.hasher.hash(password);
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AccountError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate and trim a display name.
fn validate_name(name: &str) -> Result<String, AccountError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AccountError::InvalidName("name cannot be empty".to_owned()));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AccountError::InvalidName(format!(
            "name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_owned())
}
