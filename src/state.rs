use std::net::IpAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use crate::auth::{CredentialVerifier, FallbackRegistry, PasswordHasher, ProfileRegistry};
use crate::config::Config;
use crate::db::Store;
use crate::domain::AuthContext;
use crate::services::{AuthService, ProvisionReport, SeaOrmAuthService, provision_groups};

/// Everything a command or request handler needs, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth: Arc<dyn AuthService>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_registries(
            config,
            &FallbackRegistry::with_builtins(),
            &ProfileRegistry::with_builtins(),
        )
        .await
    }

    /// Resolves the configured plugins before touching the database, then
    /// provisions the default groups. An unknown plugin key fails here.
    pub async fn with_registries(
        config: Config,
        fallbacks: &FallbackRegistry,
        profiles: &ProfileRegistry,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let hasher = PasswordHasher::from_config(&config.security)?;
        let fallback = fallbacks.resolve(&config)?;
        let profile = profiles.resolve(&config)?;

        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await
        .context("Failed to open identity store")?;

        provision_groups(&store, &config.auth).await?;

        let auth: Arc<dyn AuthService> = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            CredentialVerifier::new(hasher, fallback),
            profile,
            config.security.clone(),
        ));

        info!(bcrypt_cost = hasher.cost(), "Auth service ready");

        Ok(Self {
            config: Arc::new(config),
            store,
            auth,
        })
    }

    /// Runs group provisioning against this state's store.
    pub async fn provision(&self) -> anyhow::Result<ProvisionReport> {
        provision_groups(&self.store, &self.config.auth).await
    }

    #[must_use]
    pub fn context(&self) -> AuthContext {
        AuthContext::new(self.config.clone())
    }

    #[must_use]
    pub fn context_from(&self, addr: IpAddr) -> AuthContext {
        self.context().with_remote_addr(addr)
    }
}
