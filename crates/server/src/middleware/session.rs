//! Session middleware configuration.
//!
//! Sessions are stored server-side (a `PostgresStore` in production) and
//! referenced by a signed cookie. The signing key comes from
//! `CAFE_SESSION_SECRET`; changing the secret invalidates every cookie
//! issued under the old one.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha512};
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::DirectoryConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "cafe_session";

/// Create the session layer for `store`.
///
/// # Arguments
///
/// * `store` - Session store (`PostgresStore` in production, `MemoryStore` in tests)
/// * `config` - Directory configuration (for the secret, expiry and cookie security)
#[must_use]
pub fn create_session_layer<Store>(
    store: Store,
    config: &DirectoryConfig,
) -> SessionManagerLayer<Store, SignedCookie>
where
    Store: SessionStore + Clone,
{
    let expiry = tower_sessions::cookie::time::Duration::seconds(
        i64::try_from(config.session_expiry.as_secs()).unwrap_or(i64::MAX),
    );

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(expiry))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(&config.session_secret))
}

/// Derive the 64-byte cookie signing key from the configured secret.
#[must_use]
pub fn signing_key(secret: &SecretString) -> Key {
    let digest = Sha512::digest(secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_key_is_stable_per_secret() {
        let a = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%");
        let b = SecretString::from("Zq8#Lm2!Vx7@Rt4$Np1&Hk6*Gd3^Wf9%");

        assert_eq!(signing_key(&a).signing(), signing_key(&a).signing());
        assert_ne!(signing_key(&a).signing(), signing_key(&b).signing());
    }
}
