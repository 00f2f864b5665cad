//! Pluggable secondary credential check.
//!
//! A fallback runs only after the primary bcrypt comparison failed or the stored
//! value could not be decoded. Implementations are registered under a string key
//! and resolved once at startup from `auth.fallback_auth`.

use std::collections::BTreeMap;
use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use async_trait::async_trait;
use sea_orm::DatabaseTransaction;
use tokio::task;
use tracing::{debug, info};

use super::error::AuthError;
use super::password::PasswordHasher;
use crate::config::Config;
use crate::db::repositories::user::UserRepository;
use crate::domain::{AuthContext, UserId};
use crate::entities::auth_users;

/// Registry key of [`LegacyArgon2Fallback`].
pub const LEGACY_ARGON2: &str = "legacy_argon2";

#[async_trait]
pub trait FallbackAuthenticator: Send + Sync {
    /// Decides whether `secret` authenticates `user`.
    ///
    /// Runs inside the verifying transaction; any writes must go through `txn`.
    async fn check(
        &self,
        txn: &DatabaseTransaction,
        ctx: &AuthContext,
        user: &auth_users::Model,
        secret: &str,
    ) -> Result<bool, AuthError>;
}

pub type FallbackFactory =
    Box<dyn Fn(&Config) -> Result<Arc<dyn FallbackAuthenticator>, AuthError> + Send + Sync>;

/// Maps configuration keys to fallback constructors.
#[derive(Default)]
pub struct FallbackRegistry {
    factories: BTreeMap<String, FallbackFactory>,
}

impl FallbackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the fallbacks shipped with this crate.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(LEGACY_ARGON2, |config| {
            Ok(Arc::new(LegacyArgon2Fallback::from_config(config)?) as Arc<dyn FallbackAuthenticator>)
        });
        registry
    }

    /// Adds or replaces the factory stored under `key`.
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn(&Config) -> Result<Arc<dyn FallbackAuthenticator>, AuthError> + Send + Sync + 'static,
    {
        self.factories.insert(key.into(), Box::new(factory));
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Builds the fallback named by `auth.fallback_auth`.
    ///
    /// Returns `Ok(None)` when none is configured and a configuration error when
    /// the key is unknown.
    pub fn resolve(
        &self,
        config: &Config,
    ) -> Result<Option<Arc<dyn FallbackAuthenticator>>, AuthError> {
        let Some(key) = config
            .auth
            .fallback_auth
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        else {
            return Ok(None);
        };

        let factory = self.factories.get(key).ok_or_else(|| {
            AuthError::Configuration(format!(
                "unknown fallback authenticator '{key}' (registered: {})",
                self.keys().collect::<Vec<_>>().join(", ")
            ))
        })?;

        let fallback = factory(config)?;
        info!(fallback = key, "Fallback authenticator enabled");
        Ok(Some(fallback))
    }
}

/// Accepts Argon2 PHC hashes written by an earlier password scheme and,
/// when enabled, rewrites them with the current bcrypt scheme on success.
pub struct LegacyArgon2Fallback {
    hasher: PasswordHasher,
    upgrade: bool,
}

impl LegacyArgon2Fallback {
    #[must_use]
    pub const fn new(hasher: PasswordHasher, upgrade: bool) -> Self {
        Self { hasher, upgrade }
    }

    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        Ok(Self::new(
            PasswordHasher::from_config(&config.security)?,
            config.security.upgrade_legacy_hashes,
        ))
    }
}

fn verify_argon2(secret: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

#[async_trait]
impl FallbackAuthenticator for LegacyArgon2Fallback {
    async fn check(
        &self,
        txn: &DatabaseTransaction,
        _ctx: &AuthContext,
        user: &auth_users::Model,
        secret: &str,
    ) -> Result<bool, AuthError> {
        if !user.password_hash.starts_with("$argon2") {
            return Ok(false);
        }

        let stored = user.password_hash.clone();
        let candidate = secret.to_string();
        let valid = task::spawn_blocking(move || verify_argon2(&candidate, &stored)).await?;

        if !valid {
            debug!(user_id = user.id, "Legacy hash did not match");
            return Ok(false);
        }

        if self.upgrade {
            let upgraded = self.hasher.hash_blocking(secret.to_string()).await?;
            UserRepository::new(txn)
                .set_password_hash(UserId::new(user.id), &upgraded)
                .await?;
            info!(user_id = user.id, "Upgraded legacy password hash");
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher as _, SaltString, rand_core::OsRng};

    fn argon2_hash(secret: &str) -> String {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(secret.as_bytes(), &salt)
            .unwrap()
            .to_string()
    }

    #[test]
    fn argon2_helper_verifies() {
        let stored = argon2_hash("hunter2");
        assert!(verify_argon2("hunter2", &stored));
        assert!(!verify_argon2("hunter3", &stored));
        assert!(!verify_argon2("hunter2", "garbage"));
    }

    #[test]
    fn unconfigured_fallback_resolves_to_none() {
        let registry = FallbackRegistry::with_builtins();
        assert!(registry.resolve(&Config::default()).unwrap().is_none());
    }

    #[test]
    fn unknown_key_fails_fast() {
        let registry = FallbackRegistry::with_builtins();
        let mut config = Config::default();
        config.auth.fallback_auth = Some("ldap.bind".to_string());
        let err = registry.resolve(&config).err().unwrap();
        assert!(matches!(err, AuthError::Configuration(ref m) if m.contains("ldap.bind")));
    }

    #[test]
    fn builtin_key_resolves() {
        let registry = FallbackRegistry::with_builtins();
        let mut config = Config::default();
        config.auth.fallback_auth = Some(LEGACY_ARGON2.to_string());
        assert!(registry.resolve(&config).unwrap().is_some());
        assert_eq!(registry.keys().collect::<Vec<_>>(), [LEGACY_ARGON2]);
    }

    #[test]
    fn factory_errors_surface_at_resolution() {
        let registry = FallbackRegistry::with_builtins();
        let mut config = Config::default();
        config.auth.fallback_auth = Some(LEGACY_ARGON2.to_string());
        config.security.bcrypt_cost = 99;
        assert!(registry.resolve(&config).is_err());
    }
}
