//! Domain models for the cafe directory.
//!
//! These types represent validated domain objects separate from database row
//! types; rows are converted at the repository boundary.

pub mod cafe;
pub mod session;
pub mod user;

pub use cafe::{Cafe, CafeFields, CafeInput};
pub use session::{CurrentUser, Identity, keys as session_keys};
pub use user::{NewUser, User};
