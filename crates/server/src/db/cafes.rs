//! Cafe repository for database operations.

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use url::Url;

use cafe_finder_core::{CafeId, CafeName, CoffeeRating, PowerRating, WifiRating};

use super::{RepositoryError, map_unique_violation};
use crate::models::cafe::{Cafe, CafeFields};

/// Persistence operations for cafe listings.
pub trait CafeRepository: Send + Sync + 'static {
    /// All cafes in creation order.
    fn list(&self) -> impl Future<Output = Result<Vec<Cafe>, RepositoryError>> + Send;

    /// Get a cafe by ID.
    fn get(&self, id: CafeId)
    -> impl Future<Output = Result<Option<Cafe>, RepositoryError>> + Send;

    /// Get a cafe by canonical name.
    ///
    /// Only useful as an advisory lookup; it proves nothing about what a
    /// later insert will find.
    fn find_by_name(
        &self,
        name: &CafeName,
    ) -> impl Future<Output = Result<Option<Cafe>, RepositoryError>> + Send;

    /// Insert a new cafe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` naming [`CAFES_NAME_KEY`](super::CAFES_NAME_KEY)
    /// if another cafe already has this name.
    fn insert(
        &self,
        fields: &CafeFields,
    ) -> impl Future<Output = Result<Cafe, RepositoryError>> + Send;

    /// Replace every mutable field of a cafe.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no cafe has this ID and
    /// `RepositoryError::Conflict` if a different cafe already has the new name.
    fn update(
        &self,
        id: CafeId,
        fields: &CafeFields,
    ) -> impl Future<Output = Result<Cafe, RepositoryError>> + Send;

    /// Delete a cafe.
    ///
    /// Returns `true` if the cafe was deleted, `false` if it didn't exist.
    fn delete(&self, id: CafeId) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

const CAFE_COLUMNS: &str = "id, name, map_url, street_intersection, opening_time, closing_time, \
     coffee_rating, wifi_rating, power_rating, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CafeRow {
    id: CafeId,
    name: String,
    map_url: String,
    street_intersection: String,
    opening_time: String,
    closing_time: String,
    coffee_rating: i16,
    wifi_rating: i16,
    power_rating: i16,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn corrupt(id: CafeId, e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::DataCorruption(format!("cafe {id}: {e}"))
}

/// A stored name must already be canonical; rewriting it on read would let
/// two rows present the same name.
fn stored_name(id: CafeId, raw: &str) -> Result<CafeName, RepositoryError> {
    let name = CafeName::parse(raw).map_err(|e| corrupt(id, e))?;
    if name.as_str() != raw {
        return Err(corrupt(id, format!("name {raw:?} is not canonical")));
    }
    Ok(name)
}

impl TryFrom<CafeRow> for Cafe {
    type Error = RepositoryError;

    fn try_from(r: CafeRow) -> Result<Self, Self::Error> {
        let id = r.id;

        Ok(Self {
            id,
            name: stored_name(id, &r.name)?,
            map_url: Url::parse(&r.map_url).map_err(|e| corrupt(id, e))?,
            street_intersection: r.street_intersection,
            opening_time: r.opening_time,
            closing_time: r.closing_time,
            coffee_rating: CoffeeRating::from_level(r.coffee_rating).map_err(|e| corrupt(id, e))?,
            wifi_rating: WifiRating::from_level(r.wifi_rating).map_err(|e| corrupt(id, e))?,
            power_rating: PowerRating::from_level(r.power_rating).map_err(|e| corrupt(id, e))?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// `PostgreSQL` implementation of [`CafeRepository`].
#[derive(Debug, Clone)]
pub struct PgCafeRepository {
    pool: PgPool,
}

impl PgCafeRepository {
    /// Create a new cafe repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CafeRepository for PgCafeRepository {
    async fn list(&self) -> Result<Vec<Cafe>, RepositoryError> {
        let sql = format!("SELECT {CAFE_COLUMNS} FROM directory.cafes ORDER BY id ASC");

        sqlx::query_as::<_, CafeRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Cafe::try_from)
            .collect()
    }

    async fn get(&self, id: CafeId) -> Result<Option<Cafe>, RepositoryError> {
        let sql = format!("SELECT {CAFE_COLUMNS} FROM directory.cafes WHERE id = $1");

        sqlx::query_as::<_, CafeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Cafe::try_from)
            .transpose()
    }

    async fn find_by_name(&self, name: &CafeName) -> Result<Option<Cafe>, RepositoryError> {
        let sql = format!("SELECT {CAFE_COLUMNS} FROM directory.cafes WHERE name = $1");

        sqlx::query_as::<_, CafeRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .map(Cafe::try_from)
            .transpose()
    }

    async fn insert(&self, fields: &CafeFields) -> Result<Cafe, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO directory.cafes (
                name, map_url, street_intersection, opening_time, closing_time,
                coffee_rating, wifi_rating, power_rating
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {CAFE_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(&fields.name)
            .bind(fields.map_url.as_str())
            .bind(&fields.street_intersection)
            .bind(&fields.opening_time)
            .bind(&fields.closing_time)
            .bind(fields.coffee_rating.level())
            .bind(fields.wifi_rating.level())
            .bind(fields.power_rating.level())
            .fetch_one(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        Cafe::try_from(row)
    }

    async fn update(&self, id: CafeId, fields: &CafeFields) -> Result<Cafe, RepositoryError> {
        let sql = format!(
            r"
            UPDATE directory.cafes
            SET name = $2,
                map_url = $3,
                street_intersection = $4,
                opening_time = $5,
                closing_time = $6,
                coffee_rating = $7,
                wifi_rating = $8,
                power_rating = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CAFE_COLUMNS}
            "
        );

        let row = sqlx::query_as::<_, CafeRow>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(fields.map_url.as_str())
            .bind(&fields.street_intersection)
            .bind(&fields.opening_time)
            .bind(&fields.closing_time)
            .bind(fields.coffee_rating.level())
            .bind(fields.wifi_rating.level())
            .bind(fields.power_rating.level())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_unique_violation)?
            .ok_or(RepositoryError::NotFound)?;

        Cafe::try_from(row)
    }

    async fn delete(&self, id: CafeId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM directory.cafes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
