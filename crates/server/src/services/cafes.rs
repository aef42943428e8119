//! Cafe registry.
//!
//! Create, edit and delete cafe listings. Names are canonicalized before
//! they are compared or stored, and uniqueness is decided by the storage
//! constraint at write time.

use thiserror::Error;

use cafe_finder_core::{CafeId, CafeName, CafeNameError};

use super::access::Privileged;
use crate::db::{CAFES_NAME_KEY, CafeRepository, RepositoryError};
use crate::models::cafe::{Cafe, CafeFields, CafeInput};

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum CafeError {
    /// The name is blank or too long.
    #[error("invalid cafe name: {0}")]
    InvalidName(#[from] CafeNameError),

    /// A field other than the name failed validation.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    /// Another cafe already uses this canonical name.
    #[error("cafe {0} already exists")]
    Conflict(CafeName),

    /// No cafe has this ID.
    #[error("cafe {0} not found")]
    NotFound(CafeId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Cafe registry service.
#[derive(Debug, Clone)]
pub struct CafeRegistry<R> {
    cafes: R,
}

impl<R: CafeRepository> CafeRegistry<R> {
    /// Create a new registry.
    #[must_use]
    pub const fn new(cafes: R) -> Self {
        Self { cafes }
    }

    /// Every cafe, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::Repository` if the database operation fails.
    pub async fn list(&self) -> Result<Vec<Cafe>, CafeError> {
        Ok(self.cafes.list().await?)
    }

    /// A single cafe.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::NotFound` if no cafe has this ID.
    pub async fn get(&self, id: CafeId) -> Result<Cafe, CafeError> {
        self.cafes.get(id).await?.ok_or(CafeError::NotFound(id))
    }

    /// Add a cafe.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::InvalidName` or `CafeError::InvalidField` for bad input.
    /// Returns `CafeError::Conflict` if the canonical name is taken.
    pub async fn create(&self, input: CafeInput) -> Result<Cafe, CafeError> {
        let fields = canonicalize(input)?;

        // Advisory only; the insert below is what decides.
        if self.cafes.find_by_name(&fields.name).await?.is_some() {
            tracing::debug!(cafe_name = %fields.name, "cafe name already listed");
        }

        let cafe = self
            .cafes
            .insert(&fields)
            .await
            .map_err(|e| name_conflict(e, &fields.name))?;

        tracing::info!(cafe_id = %cafe.id, cafe_name = %cafe.name, "cafe added");
        Ok(cafe)
    }

    /// Replace every field of an existing cafe.
    ///
    /// Keeping the cafe's own name is not a conflict.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::NotFound` if no cafe has this ID; nothing is changed.
    /// Returns `CafeError::Conflict` if a different cafe has the new name.
    pub async fn update(&self, id: CafeId, input: CafeInput) -> Result<Cafe, CafeError> {
        let fields = canonicalize(input)?;

        let cafe = self
            .cafes
            .update(id, &fields)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CafeError::NotFound(id),
                other => name_conflict(other, &fields.name),
            })?;

        tracing::info!(cafe_id = %cafe.id, cafe_name = %cafe.name, "cafe updated");
        Ok(cafe)
    }

    /// Remove a cafe. Only the administrator may do this.
    ///
    /// # Errors
    ///
    /// Returns `CafeError::NotFound` if no cafe has this ID.
    pub async fn delete(&self, by: &Privileged, id: CafeId) -> Result<(), CafeError> {
        if !self.cafes.delete(id).await? {
            return Err(CafeError::NotFound(id));
        }

        tracing::info!(cafe_id = %id, admin_id = %by.user_id(), "cafe deleted");
        Ok(())
    }
}

fn name_conflict(e: RepositoryError, name: &CafeName) -> CafeError {
    if e.is_conflict_on(CAFES_NAME_KEY) {
        tracing::info!(cafe_name = %name, "cafe rejected: name taken");
        CafeError::Conflict(name.clone())
    } else {
        CafeError::Repository(e)
    }
}

/// Validate caller input and canonicalize the name.
fn canonicalize(input: CafeInput) -> Result<CafeFields, CafeError> {
    let name = CafeName::parse(&input.name)?;

    if !matches!(input.map_url.scheme(), "http" | "https") {
        return Err(CafeError::InvalidField {
            field: "map_url",
            reason: "must be an http or https link",
        });
    }

    Ok(CafeFields {
        name,
        map_url: input.map_url,
        street_intersection: required("street_intersection", input.street_intersection)?,
        opening_time: required("opening_time", input.opening_time)?,
        closing_time: required("closing_time", input.closing_time)?,
        coffee_rating: input.coffee_rating,
        wifi_rating: input.wifi_rating,
        power_rating: input.power_rating,
    })
}

fn required(field: &'static str, value: String) -> Result<String, CafeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CafeError::InvalidField {
            field,
            reason: "cannot be empty",
        });
    }
    Ok(trimmed.to_owned())
}
