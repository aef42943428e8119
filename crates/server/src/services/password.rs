//! Password hashing.
//!
//! Argon2id with a fresh random salt per hash, stored as a PHC string.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

/// One-way hashing and verification of account secrets.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Hasher with explicit Argon2id cost parameters.
    ///
    /// Production code uses [`Default`]; tests lower the cost to stay fast.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are outside Argon2's limits.
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, argon2::Error> {
        let params = Params::new(memory_kib, iterations, parallelism, None)?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a secret into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails.
    pub fn hash(&self, secret: &str) -> Result<String, password_hash::Error> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(secret.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Check a secret against a stored PHC string.
    ///
    /// A digest that does not parse is treated as a mismatch.
    #[must_use]
    pub fn verify(&self, secret: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            tracing::warn!("stored password hash is not a valid PHC string");
            return false;
        };

        self.argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}
