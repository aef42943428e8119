//! Cafe domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use cafe_finder_core::{CafeId, CafeName, CoffeeRating, PowerRating, WifiRating};

/// A cafe listing (domain type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cafe {
    /// Unique cafe ID.
    pub id: CafeId,
    /// Canonical name; unique across the directory.
    pub name: CafeName,
    /// Map location link.
    pub map_url: Url,
    /// Area or street intersection, e.g. "Main & 49th".
    pub street_intersection: String,
    /// Opening time as entered, e.g. "8AM".
    pub opening_time: String,
    /// Closing time as entered, e.g. "5:30PM".
    pub closing_time: String,
    pub coffee_rating: CoffeeRating,
    pub wifi_rating: WifiRating,
    pub power_rating: PowerRating,
    /// When the listing was added.
    pub created_at: DateTime<Utc>,
    /// When the listing was last edited.
    pub updated_at: DateTime<Utc>,
}

/// Cafe fields as submitted by a caller.
///
/// The name is raw; the registry canonicalizes it into [`CafeFields`]
/// before anything is compared or stored.
#[derive(Debug, Clone, Deserialize)]
pub struct CafeInput {
    pub name: String,
    pub map_url: Url,
    pub street_intersection: String,
    pub opening_time: String,
    pub closing_time: String,
    pub coffee_rating: CoffeeRating,
    pub wifi_rating: WifiRating,
    pub power_rating: PowerRating,
}

/// Validated, canonical cafe fields ready for storage.
///
/// Used for both inserts and full-replace updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CafeFields {
    pub name: CafeName,
    pub map_url: Url,
    pub street_intersection: String,
    pub opening_time: String,
    pub closing_time: String,
    pub coffee_rating: CoffeeRating,
    pub wifi_rating: WifiRating,
    pub power_rating: PowerRating,
}
