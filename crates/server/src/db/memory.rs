//! In-memory storage for tests.
//!
//! Mirrors the database constraints: a duplicate email or cafe name is
//! rejected with the same [`RepositoryError::Conflict`] the `PostgreSQL`
//! repositories produce, and the check happens under the same lock as the
//! write so concurrent callers see exactly one winner.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use cafe_finder_core::{CafeId, CafeName, Email, Role, UserId};

use super::{
    CAFES_NAME_KEY, CafeRepository, RepositoryError, Storage, USERS_EMAIL_KEY, UserRepository,
};
use crate::models::cafe::{Cafe, CafeFields};
use crate::models::user::{NewUser, User};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct UserTable {
    rows: Vec<(User, String)>,
}

#[derive(Debug, Default)]
struct CafeTable {
    next_id: i32,
    rows: Vec<Cafe>,
}

/// Storage backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    users: Arc<Mutex<UserTable>>,
    cafes: Arc<Mutex<CafeTable>>,
}

impl MemoryStorage {
    /// Create empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    type Users = MemoryUserRepository;
    type Cafes = MemoryCafeRepository;

    fn users(&self) -> Self::Users {
        MemoryUserRepository {
            table: Arc::clone(&self.users),
        }
    }

    fn cafes(&self) -> Self::Cafes {
        MemoryCafeRepository {
            table: Arc::clone(&self.cafes),
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// In-memory [`UserRepository`].
#[derive(Debug, Clone, Default)]
pub struct MemoryUserRepository {
    table: Arc<Mutex<UserTable>>,
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut table = lock(&self.table);

        if table.rows.iter().any(|(u, _)| u.email == new_user.email) {
            return Err(RepositoryError::Conflict(USERS_EMAIL_KEY.to_owned()));
        }

        let role = if table.rows.is_empty() {
            Role::Admin
        } else {
            Role::Member
        };
        let id = i32::try_from(table.rows.len() + 1)
            .map_err(|_| RepositoryError::DataCorruption("user id overflow".to_owned()))?;

        let user = User {
            id: UserId::new(id),
            email: new_user.email.clone(),
            name: new_user.name.clone(),
            role,
            created_at: Utc::now(),
        };
        table
            .rows
            .push((user.clone(), new_user.password_hash.clone()));

        Ok(user)
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .find(|(u, _)| u.id == id)
            .map(|(u, _)| u.clone()))
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .find(|(u, _)| &u.email == email)
            .map(|(u, _)| u.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .find(|(u, _)| &u.email == email)
            .cloned())
    }
}

/// In-memory [`CafeRepository`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCafeRepository {
    table: Arc<Mutex<CafeTable>>,
}

impl CafeRepository for MemoryCafeRepository {
    async fn list(&self) -> Result<Vec<Cafe>, RepositoryError> {
        let mut cafes = lock(&self.table).rows.clone();
        cafes.sort_by_key(|c| c.id);
        Ok(cafes)
    }

    async fn get(&self, id: CafeId) -> Result<Option<Cafe>, RepositoryError> {
        Ok(lock(&self.table).rows.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_name(&self, name: &CafeName) -> Result<Option<Cafe>, RepositoryError> {
        Ok(lock(&self.table)
            .rows
            .iter()
            .find(|c| &c.name == name)
            .cloned())
    }

    async fn insert(&self, fields: &CafeFields) -> Result<Cafe, RepositoryError> {
        let mut table = lock(&self.table);

        if table.rows.iter().any(|c| c.name == fields.name) {
            return Err(RepositoryError::Conflict(CAFES_NAME_KEY.to_owned()));
        }

        // SERIAL semantics: IDs are never reused after a delete.
        table.next_id += 1;
        let now = Utc::now();
        let cafe = Cafe {
            id: CafeId::new(table.next_id),
            name: fields.name.clone(),
            map_url: fields.map_url.clone(),
            street_intersection: fields.street_intersection.clone(),
            opening_time: fields.opening_time.clone(),
            closing_time: fields.closing_time.clone(),
            coffee_rating: fields.coffee_rating,
            wifi_rating: fields.wifi_rating,
            power_rating: fields.power_rating,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(cafe.clone());

        Ok(cafe)
    }

    async fn update(&self, id: CafeId, fields: &CafeFields) -> Result<Cafe, RepositoryError> {
        let mut table = lock(&self.table);

        if !table.rows.iter().any(|c| c.id == id) {
            return Err(RepositoryError::NotFound);
        }
        if table
            .rows
            .iter()
            .any(|c| c.id != id && c.name == fields.name)
        {
            return Err(RepositoryError::Conflict(CAFES_NAME_KEY.to_owned()));
        }

        let cafe = table
            .rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound)?;

        cafe.name = fields.name.clone();
        cafe.map_url = fields.map_url.clone();
        cafe.street_intersection = fields.street_intersection.clone();
        cafe.opening_time = fields.opening_time.clone();
        cafe.closing_time = fields.closing_time.clone();
        cafe.coffee_rating = fields.coffee_rating;
        cafe.wifi_rating = fields.wifi_rating;
        cafe.power_rating = fields.power_rating;
        cafe.updated_at = Utc::now();

        Ok(cafe.clone())
    }

    async fn delete(&self, id: CafeId) -> Result<bool, RepositoryError> {
        let mut table = lock(&self.table);
        let before = table.rows.len();
        table.rows.retain(|c| c.id != id);
        Ok(table.rows.len() < before)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cafe_finder_core::{CoffeeRating, PowerRating, WifiRating};
    use url::Url;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            name: "Someone".to_owned(),
        }
    }

    fn fields(name: &str) -> CafeFields {
        CafeFields {
            name: CafeName::parse(name).unwrap(),
            map_url: Url::parse("https://maps.example.com/x").unwrap(),
            street_intersection: "Main & 1st".to_owned(),
            opening_time: "8AM".to_owned(),
            closing_time: "6PM".to_owned(),
            coffee_rating: CoffeeRating::Three,
            wifi_rating: WifiRating::Two,
            power_rating: PowerRating::One,
        }
    }

    #[tokio::test]
    async fn test_first_user_is_admin() {
        let users = MemoryStorage::new().users();
        let first = users.create(&new_user("a@x.test")).await.unwrap();
        let second = users.create(&new_user("b@x.test")).await.unwrap();
        assert_eq!(first.role, Role::Admin);
        assert_eq!(second.role, Role::Member);
        assert!(first.id < second.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let users = MemoryStorage::new().users();
        users.create(&new_user("a@x.test")).await.unwrap();
        let err = users.create(&new_user("a@x.test")).await.unwrap_err();
        assert!(err.is_conflict_on(USERS_EMAIL_KEY));
    }

    #[tokio::test]
    async fn test_emails_compare_exactly() {
        let users = MemoryStorage::new().users();
        users.create(&new_user("a@x.test")).await.unwrap();
        assert!(users.create(&new_user("A@x.test")).await.is_ok());
    }

    #[tokio::test]
    async fn test_cafe_ids_not_reused() {
        let cafes = MemoryStorage::new().cafes();
        let first = cafes.insert(&fields("one")).await.unwrap();
        assert!(cafes.delete(first.id).await.unwrap());
        let second = cafes.insert(&fields("two")).await.unwrap();
        assert!(second.id > first.id);
        assert!(!cafes.delete(first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_conflict_and_self_rename() {
        let cafes = MemoryStorage::new().cafes();
        let a = cafes.insert(&fields("alpha")).await.unwrap();
        cafes.insert(&fields("beta")).await.unwrap();

        let err = cafes.update(a.id, &fields("beta")).await.unwrap_err();
        assert!(err.is_conflict_on(CAFES_NAME_KEY));

        let same = cafes.update(a.id, &fields("alpha")).await.unwrap();
        assert_eq!(same.name.as_str(), "Alpha");

        let missing = cafes.update(CafeId::new(99), &fields("gamma")).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound)));
    }
}
