//! Credential and identity core: hashing, verification, pluggable fallbacks
//! and profile kinds.

pub mod error;
pub mod fallback;
pub mod password;
pub mod profile;
pub mod verifier;

pub use error::AuthError;
pub use fallback::{FallbackAuthenticator, FallbackRegistry, LEGACY_ARGON2, LegacyArgon2Fallback};
pub use password::{HashedCredential, PasswordHasher, Verification};
pub use profile::{ProfileKind, ProfileRegistry, USER_PROFILE, UserProfileKind};
pub use verifier::CredentialVerifier;
