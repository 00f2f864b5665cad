use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::domain::{IdentityId, UserId};
use crate::entities::{auth_groups, auth_id, auth_profiles, auth_user_log, auth_users};

pub mod migrator;
pub mod repositories;

use repositories::group::GroupRepository;
use repositories::identity::IdentityRepository;
use repositories::profile::ProfileRepository;
use repositories::user::UserRepository;
use repositories::user_log::UserLogRepository;

pub use repositories::user::{LOCAL_PROVIDER, NewUser, UserRecord};

/// Identity store: pooled connection plus lookups that never treat "not found"
/// as an error.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if db_url.starts_with("sqlite:") && !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite:")
                .trim_start_matches("//")
                .split('?')
                .next()
                .unwrap_or_default();
            if let Some(parent) = Path::new(path_str)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
            {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Failed to connect to database")?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    /// Opens the transaction one operation runs in.
    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        self.conn
            .begin()
            .await
            .context("Failed to begin transaction")
    }

    fn users(&self) -> UserRepository<'_, DatabaseConnection> {
        UserRepository::new(&self.conn)
    }

    fn identities(&self) -> IdentityRepository<'_, DatabaseConnection> {
        IdentityRepository::new(&self.conn)
    }

    fn groups(&self) -> GroupRepository<'_, DatabaseConnection> {
        GroupRepository::new(&self.conn)
    }

    fn user_log(&self) -> UserLogRepository<'_, DatabaseConnection> {
        UserLogRepository::new(&self.conn)
    }

    fn profiles(&self) -> ProfileRepository<'_, DatabaseConnection> {
        ProfileRepository::new(&self.conn)
    }

    pub async fn get_user_by_id(&self, id: UserId) -> Result<Option<auth_users::Model>> {
        self.users().get_by_id(id).await
    }

    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<auth_users::Model>> {
        self.users().get_by_login(login).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<auth_users::Model>> {
        self.users().get_by_email(email).await
    }

    pub async fn get_identity(&self, id: IdentityId) -> Result<Option<auth_id::Model>> {
        self.identities().get(id).await
    }

    pub async fn list_credentials(&self, id: IdentityId) -> Result<Vec<UserRecord>> {
        Ok(self
            .users()
            .list_for_identity(id)
            .await?
            .into_iter()
            .map(UserRecord::from)
            .collect())
    }

    pub async fn list_groups(&self) -> Result<Vec<auth_groups::Model>> {
        self.groups().list().await
    }

    pub async fn get_group_by_name(&self, name: &str) -> Result<Option<auth_groups::Model>> {
        self.groups().get_by_name(name).await
    }

    pub async fn groups_for(&self, id: IdentityId) -> Result<Vec<auth_groups::Model>> {
        self.groups().groups_for(id).await
    }

    pub async fn in_group(&self, id: IdentityId, group_name: &str) -> Result<bool> {
        self.groups().is_member(id, group_name).await
    }

    /// Comma-joined names of the identity's groups, in group creation order.
    pub async fn group_list(&self, id: IdentityId) -> Result<String> {
        let names: Vec<String> = self
            .groups_for(id)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect();
        Ok(names.join(","))
    }

    pub async fn last_login(&self, id: IdentityId) -> Result<Option<auth_user_log::Model>> {
        self.user_log().latest(id).await
    }

    pub async fn login_history(
        &self,
        id: IdentityId,
        limit: u64,
    ) -> Result<Vec<auth_user_log::Model>> {
        self.user_log().history(id, limit).await
    }

    pub async fn get_profile(&self, id: IdentityId) -> Result<Option<auth_profiles::Model>> {
        self.profiles().get(id).await
    }

    /// Get-or-create on the built-in profile table, outside any caller transaction.
    pub async fn get_or_create_profile(&self, id: IdentityId) -> Result<auth_profiles::Model> {
        self.profiles().get_or_create(id).await
    }
}
