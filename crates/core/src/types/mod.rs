//! Core types for Cafe Finder.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cafe_name;
pub mod email;
pub mod id;
pub mod rating;
pub mod role;

pub use cafe_name::{CafeName, CafeNameError};
pub use email::{Email, EmailError};
pub use id::*;
pub use rating::{CoffeeRating, PowerRating, RatingError, WifiRating};
pub use role::{Role, RoleParseError};
