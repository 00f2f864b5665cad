//! Two-stage password hashing: SHA-512 pre-hash, then bcrypt.
//!
//! bcrypt only reads the first 72 bytes of its input. Feeding it the 64-byte
//! SHA-512 digest of the secret instead means every byte of an arbitrarily long
//! secret contributes to the stored hash. The pre-hash is part of the stored
//! format: changing it invalidates every existing hash.

use sha2::{Digest, Sha512};
use std::fmt;
use tokio::task;

use super::error::AuthError;
use crate::config::SecurityConfig;

pub const DEFAULT_COST: u32 = 13;
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// Encoded bcrypt output (`$2b$<cost>$<salt+hash>`). Never holds plaintext.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedCredential(String);

impl HashedCredential {
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for HashedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashedCredential(..)")
    }
}

/// Outcome of comparing a secret with a stored encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Match,
    Mismatch,
    /// The stored value is not a decodable bcrypt hash (empty, truncated, legacy).
    Malformed,
}

impl Verification {
    #[must_use]
    pub const fn is_match(self) -> bool {
        matches!(self, Self::Match)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AuthError::Configuration(format!(
                "bcrypt cost must be between {} and {}, got {cost}",
                MIN_COST,
                MAX_COST
            )));
        }
        Ok(Self { cost })
    }

    pub fn from_config(config: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(config.bcrypt_cost)
    }

    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Reduces a secret of any length to a fixed 64-byte digest.
    #[must_use]
    pub fn pre_hash(secret: &[u8]) -> Vec<u8> {
        Sha512::digest(secret).to_vec()
    }

    pub fn hash(&self, secret: &[u8]) -> Result<HashedCredential, AuthError> {
        let encoded = bcrypt::hash(Self::pre_hash(secret), self.cost)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(HashedCredential(encoded))
    }

    /// Compares `secret` with `stored`, telling a mismatch apart from an
    /// undecodable stored value. Never fails.
    #[must_use]
    pub fn check(&self, secret: &[u8], stored: &str) -> Verification {
        match bcrypt::verify(Self::pre_hash(secret), stored) {
            Ok(true) => Verification::Match,
            Ok(false) => Verification::Mismatch,
            Err(_) => Verification::Malformed,
        }
    }

    #[must_use]
    pub fn verify(&self, secret: &[u8], stored: &HashedCredential) -> bool {
        self.check(secret, stored.as_str()).is_match()
    }

    /// [`Self::hash`] on the blocking pool; bcrypt at production cost takes
    /// hundreds of milliseconds.
    pub async fn hash_blocking(self, secret: String) -> Result<HashedCredential, AuthError> {
        task::spawn_blocking(move || self.hash(secret.as_bytes())).await?
    }

    /// [`Self::check`] on the blocking pool.
    pub async fn check_blocking(
        self,
        secret: String,
        stored: String,
    ) -> Result<Verification, AuthError> {
        Ok(task::spawn_blocking(move || self.check(secret.as_bytes(), &stored)).await?)
    }
}
