//! Cafe rating scales.
//!
//! Each scale is a fixed, ordered set of symbolic levels. Ratings are stored
//! as their numeric level and exchanged with callers as their symbol.

use core::fmt;

/// Error returned when a rating symbol or stored level is not on the scale.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {scale} rating: {value}")]
pub struct RatingError {
    /// Which scale rejected the value.
    pub scale: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Emoji presentation selector; some keyboards append it, some don't.
const VARIATION_SELECTOR: char = '\u{fe0f}';

fn symbols_match(candidate: &str, symbol: &str) -> bool {
    candidate
        .chars()
        .filter(|c| *c != VARIATION_SELECTOR)
        .eq(symbol.chars().filter(|c| *c != VARIATION_SELECTOR))
}

macro_rules! define_rating {
    (
        $(#[$meta:meta])*
        $name:ident, $scale:literal {
            $($(#[$vmeta:meta])* $variant:ident = $level:literal => $symbol:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every level on the scale, lowest first.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Numeric level used for storage.
            #[must_use]
            pub const fn level(self) -> i16 {
                match self {
                    $(Self::$variant => $level),+
                }
            }

            /// Symbol shown to users.
            #[must_use]
            pub const fn symbol(self) -> &'static str {
                match self {
                    $(Self::$variant => $symbol),+
                }
            }

            /// Look up a stored level.
            ///
            /// # Errors
            ///
            /// Returns [`RatingError`] if the level is not on this scale.
            pub fn from_level(level: i16) -> Result<Self, RatingError> {
                match level {
                    $($level => Ok(Self::$variant),)+
                    other => Err(RatingError {
                        scale: $scale,
                        value: other.to_string(),
                    }),
                }
            }

            /// Look up a symbol as submitted by a caller.
            ///
            /// # Errors
            ///
            /// Returns [`RatingError`] if the symbol is not on this scale.
            pub fn from_symbol(symbol: &str) -> Result<Self, RatingError> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|rating| symbols_match(symbol.trim(), rating.symbol()))
                    .ok_or_else(|| RatingError {
                        scale: $scale,
                        value: symbol.to_owned(),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.symbol())
            }
        }

        impl std::str::FromStr for $name {
            type Err = RatingError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_symbol(s)
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.symbol())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::from_symbol(&raw).map_err(::serde::de::Error::custom)
            }
        }
    };
}

define_rating! {
    /// How good the coffee is.
    CoffeeRating, "coffee" {
        One = 1 => "☕️",
        Two = 2 => "☕☕",
        Three = 3 => "☕☕☕",
        Four = 4 => "☕☕☕☕",
        Five = 5 => "☕☕☕☕☕",
    }
}

define_rating! {
    /// How strong the wifi is.
    WifiRating, "wifi" {
        /// No wifi.
        None = 0 => "✘",
        One = 1 => "💪",
        Two = 2 => "💪💪",
        Three = 3 => "💪💪💪",
        Four = 4 => "💪💪💪💪",
        Five = 5 => "💪💪💪💪💪",
    }
}

define_rating! {
    /// How easy it is to find a power socket.
    PowerRating, "power" {
        /// No sockets.
        None = 0 => "✘",
        One = 1 => "🔌",
        Two = 2 => "🔌🔌",
        Three = 3 => "🔌🔌🔌",
        Four = 4 => "🔌🔌🔌🔌",
        Five = 5 => "🔌🔌🔌🔌🔌",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_are_ordered() {
        assert!(CoffeeRating::One < CoffeeRating::Five);
        assert!(WifiRating::None < WifiRating::One);
        assert!(PowerRating::Three > PowerRating::Two);

        for pair in CoffeeRating::ALL.windows(2) {
            assert!(pair[0].level() < pair[1].level());
        }
    }

    #[test]
    fn test_scale_sizes() {
        assert_eq!(CoffeeRating::ALL.len(), 5);
        assert_eq!(WifiRating::ALL.len(), 6);
        assert_eq!(PowerRating::ALL.len(), 6);
    }

    #[test]
    fn test_from_level_rejects_off_scale() {
        assert_eq!(CoffeeRating::from_level(3).unwrap(), CoffeeRating::Three);
        assert!(CoffeeRating::from_level(0).is_err());
        assert_eq!(WifiRating::from_level(0).unwrap(), WifiRating::None);
        assert!(PowerRating::from_level(6).is_err());
    }

    #[test]
    fn test_from_symbol() {
        assert_eq!(WifiRating::from_symbol("💪💪").unwrap(), WifiRating::Two);
        assert_eq!(PowerRating::from_symbol("✘").unwrap(), PowerRating::None);
        assert!(CoffeeRating::from_symbol("great").is_err());
    }

    #[test]
    fn test_variation_selector_is_optional() {
        assert_eq!(CoffeeRating::from_symbol("☕").unwrap(), CoffeeRating::One);
        assert_eq!(CoffeeRating::from_symbol("☕️").unwrap(), CoffeeRating::One);
        assert_eq!(
            CoffeeRating::from_symbol("☕\u{fe0f}☕").unwrap(),
            CoffeeRating::Two
        );
    }

    #[test]
    fn test_serde_uses_symbols() {
        let json = serde_json::to_string(&PowerRating::Two).unwrap();
        assert_eq!(json, "\"🔌🔌\"");

        let parsed: WifiRating = serde_json::from_str("\"💪💪💪\"").unwrap();
        assert_eq!(parsed, WifiRating::Three);

        let err = serde_json::from_str::<CoffeeRating>("\"🔌\"").unwrap_err();
        assert!(err.to_string().contains("invalid coffee rating"));
    }
}
