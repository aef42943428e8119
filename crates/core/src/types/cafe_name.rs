//! Canonical cafe names.
//!
//! Every cafe name goes through [`CafeName::parse`] before it is compared or
//! stored, so the database unique constraint on `cafe.name` sees one
//! spelling per cafe regardless of how the caller typed it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CafeName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CafeNameError {
    /// Nothing left after trimming whitespace.
    #[error("cafe name cannot be empty")]
    Empty,
    /// Longer than the stored column allows.
    #[error("cafe name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
}

/// A canonicalized cafe name.
///
/// Canonical form:
/// - leading and trailing whitespace removed
/// - internal whitespace runs collapsed to a single space
/// - title case: the first letter of every run of letters is upper-cased,
///   the remaining letters of the run lower-cased
///
/// ```
/// use cafe_finder_core::CafeName;
///
/// let name = CafeName::parse("  bean   THERE ").unwrap();
/// assert_eq!(name.as_str(), "Bean There");
///
/// assert_eq!(
///     CafeName::parse("bean there").unwrap(),
///     CafeName::parse("Bean There").unwrap(),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CafeName(String);

impl CafeName {
    /// Maximum length of a cafe name, in characters.
    pub const MAX_LENGTH: usize = 250;

    /// Canonicalize and validate a raw cafe name.
    ///
    /// # Errors
    ///
    /// Returns [`CafeNameError::Empty`] for blank input and
    /// [`CafeNameError::TooLong`] if the canonical form exceeds
    /// [`Self::MAX_LENGTH`] characters.
    pub fn parse(raw: &str) -> Result<Self, CafeNameError> {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return Err(CafeNameError::Empty);
        }

        let canonical = title_case(&collapsed);
        if canonical.chars().count() > Self::MAX_LENGTH {
            return Err(CafeNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        Ok(Self(canonical))
    }

    /// Returns the canonical name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `CafeName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Upper-case the first letter of each letter run and lower-case the rest.
///
/// Any non-letter (space, apostrophe, digit, hyphen) ends a run, so
/// `o'reilly` becomes `O'Reilly` and `3rd wave` becomes `3Rd Wave`.
///
/// A letter whose upper case expands to several characters only keeps the
/// first one capitalized (`ß` becomes `Ss`, `ﬁ` becomes `Fi`). Word state
/// follows the emitted text, so the result is a fixed point.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if !c.is_alphabetic() {
            out.push(c);
            in_word = false;
            continue;
        }

        if in_word {
            out.extend(c.to_lowercase());
        } else {
            let mut upper = c.to_uppercase();
            out.extend(upper.next());
            out.extend(upper.flat_map(char::to_lowercase));
        }
        in_word = out.chars().next_back().is_some_and(char::is_alphabetic);
    }

    out
}

impl fmt::Display for CafeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CafeName {
    type Err = CafeNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CafeName {
    type Error = CafeNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CafeName> for String {
    fn from(name: CafeName) -> Self {
        name.0
    }
}

impl AsRef<str> for CafeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CafeName {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CafeName {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
