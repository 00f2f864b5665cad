use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use serde::Serialize;

use crate::auth::password::HashedCredential;
use crate::domain::{ActiveState, IdentityId, UserId};
use crate::entities::{auth_users, prelude::*};

/// Provider assigned when none is given.
pub const LOCAL_PROVIDER: &str = "local";

/// Credential data returned from the repository (without the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub auth_id: Option<IdentityId>,
    pub provider: String,
    pub login: String,
    pub email: String,
    pub created: String,
    pub active: ActiveState,
    pub has_password: bool,
}

impl From<auth_users::Model> for UserRecord {
    fn from(model: auth_users::Model) -> Self {
        Self {
            id: UserId::new(model.id),
            auth_id: model.auth_id.map(IdentityId::new),
            provider: model.provider,
            login: model.login,
            email: model.email,
            created: model.created,
            active: model.active,
            has_password: !model.password_hash.is_empty(),
        }
    }
}

/// Fields for a new credential row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub auth_id: Option<IdentityId>,
    pub provider: String,
    pub login: String,
    pub email: String,
    pub password_hash: Option<HashedCredential>,
}

pub struct UserRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: UserId) -> Result<Option<auth_users::Model>> {
        AuthUsers::find_by_id(id.value())
            .one(self.conn)
            .await
            .context("Failed to query user by ID")
    }

    /// First credential (lowest id) carrying `login`, across providers.
    pub async fn get_by_login(&self, login: &str) -> Result<Option<auth_users::Model>> {
        AuthUsers::find()
            .filter(auth_users::Column::Login.eq(login))
            .order_by_asc(auth_users::Column::Id)
            .one(self.conn)
            .await
            .context("Failed to query user by login")
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<auth_users::Model>> {
        AuthUsers::find()
            .filter(auth_users::Column::Email.eq(email))
            .order_by_asc(auth_users::Column::Id)
            .one(self.conn)
            .await
            .context("Failed to query user by email")
    }

    pub async fn get_by_provider_login(
        &self,
        provider: &str,
        login: &str,
    ) -> Result<Option<auth_users::Model>> {
        AuthUsers::find()
            .filter(auth_users::Column::Provider.eq(provider))
            .filter(auth_users::Column::Login.eq(login))
            .order_by_asc(auth_users::Column::Id)
            .one(self.conn)
            .await
            .context("Failed to query user by provider and login")
    }

    pub async fn list_for_identity(&self, auth_id: IdentityId) -> Result<Vec<auth_users::Model>> {
        AuthUsers::find()
            .filter(auth_users::Column::AuthId.eq(auth_id.value()))
            .order_by_asc(auth_users::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list credentials for identity")
    }

    /// Inserts a credential row. A duplicate (identity, login, provider) surfaces
    /// as a unique-constraint `DbErr` in the error chain.
    pub async fn create(&self, new: NewUser) -> Result<auth_users::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = auth_users::ActiveModel {
            auth_id: Set(new.auth_id.map(IdentityId::value)),
            provider: Set(new.provider),
            login: Set(new.login),
            salt: Set(None),
            password_hash: Set(new
                .password_hash
                .map(HashedCredential::into_string)
                .unwrap_or_default()),
            email: Set(new.email),
            created: Set(now),
            active: Set(ActiveState::Active),
            ..Default::default()
        };

        Ok(active.insert(self.conn).await?)
    }

    /// Replaces the stored hash. Returns false if no such user exists.
    pub async fn set_password_hash(&self, id: UserId, hash: &HashedCredential) -> Result<bool> {
        let result = AuthUsers::update_many()
            .col_expr(
                auth_users::Column::PasswordHash,
                Expr::value(hash.as_str().to_string()),
            )
            .filter(auth_users::Column::Id.eq(id.value()))
            .exec(self.conn)
            .await
            .context("Failed to update password hash")?;

        Ok(result.rows_affected > 0)
    }
}
