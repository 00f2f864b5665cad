//! Per-identity profile records, selected by `auth.auth_profile`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;

use super::error::AuthError;
use crate::config::Config;
use crate::db::repositories::profile::ProfileRepository;
use crate::domain::{AuthContext, IdentityId};

/// Registry key of [`UserProfileKind`].
pub const USER_PROFILE: &str = "user_profile";

/// A kind of profile record associated 1:1 with an identity.
#[async_trait]
pub trait ProfileKind: Send + Sync {
    fn key(&self) -> &str;

    /// Returns the identity's record, creating an empty one if needed.
    ///
    /// Called as the first statement of `txn`, so implementations should write
    /// before they read (insert with `ON CONFLICT DO NOTHING`, then select).
    /// A concurrent creator must not surface as an error.
    async fn get_or_create(
        &self,
        txn: &DatabaseTransaction,
        ctx: &AuthContext,
        auth_id: IdentityId,
    ) -> Result<serde_json::Value, AuthError>;
}

/// The `auth_profiles` table shipped with this crate.
pub struct UserProfileKind;

#[async_trait]
impl ProfileKind for UserProfileKind {
    fn key(&self) -> &str {
        USER_PROFILE
    }

    async fn get_or_create(
        &self,
        txn: &DatabaseTransaction,
        _ctx: &AuthContext,
        auth_id: IdentityId,
    ) -> Result<serde_json::Value, AuthError> {
        let profile = ProfileRepository::new(txn).get_or_create(auth_id).await?;
        serde_json::to_value(profile).map_err(|e| AuthError::Internal(e.to_string()))
    }
}

#[derive(Default)]
pub struct ProfileRegistry {
    kinds: BTreeMap<String, Arc<dyn ProfileKind>>,
}

impl ProfileRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(UserProfileKind));
        registry
    }

    pub fn register(&mut self, kind: Arc<dyn ProfileKind>) {
        self.kinds.insert(kind.key().to_string(), kind);
    }

    /// Looks up `auth.auth_profile`. Unknown keys are a configuration error.
    pub fn resolve(&self, config: &Config) -> Result<Option<Arc<dyn ProfileKind>>, AuthError> {
        let Some(key) = config
            .auth
            .auth_profile
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        else {
            return Ok(None);
        };

        self.kinds.get(key).cloned().map(Some).ok_or_else(|| {
            AuthError::Configuration(format!(
                "unknown profile kind '{key}' (registered: {})",
                self.kinds.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })
    }
}
