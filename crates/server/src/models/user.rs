//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cafe_finder_core::{Email, Role, UserId};

/// A registered account (domain type).
///
/// Never carries the password hash; repositories hand that out separately
/// and only to the authentication path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique user ID, assigned in increasing order.
    pub id: UserId,
    /// Email address, exactly as registered.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Permission level.
    pub role: Role,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a new account.
///
/// The role is not part of it: storage assigns `admin` to the first account
/// and `member` to everyone after.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub name: String,
}
