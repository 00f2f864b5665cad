//! Credential verification: lookup, hash comparison, fallback delegation.

use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::debug;

use super::error::AuthError;
use super::fallback::FallbackAuthenticator;
use super::password::{PasswordHasher, Verification};
use crate::db::repositories::user::UserRepository;
use crate::domain::{AuthContext, CredentialQuery};
use crate::entities::auth_users;

#[derive(Clone)]
pub struct CredentialVerifier {
    hasher: PasswordHasher,
    fallback: Option<Arc<dyn FallbackAuthenticator>>,
}

impl CredentialVerifier {
    #[must_use]
    pub fn new(hasher: PasswordHasher, fallback: Option<Arc<dyn FallbackAuthenticator>>) -> Self {
        Self { hasher, fallback }
    }

    #[must_use]
    pub const fn hasher(&self) -> PasswordHasher {
        self.hasher
    }

    /// Verifies `secret` in a transaction of its own, committed on success.
    pub async fn check(
        &self,
        conn: &DatabaseConnection,
        ctx: &AuthContext,
        query: &CredentialQuery,
        secret: &str,
    ) -> Result<bool, AuthError> {
        let txn = conn.begin().await?;
        let verified = self.check_in(&txn, ctx, query, secret).await?;
        txn.commit().await?;
        Ok(verified)
    }

    /// Verifies `secret` inside the caller's transaction.
    pub async fn check_in(
        &self,
        txn: &DatabaseTransaction,
        ctx: &AuthContext,
        query: &CredentialQuery,
        secret: &str,
    ) -> Result<bool, AuthError> {
        let Some(user) = Self::resolve(txn, query).await? else {
            debug!(?query, "No credential matched");
            return Ok(false);
        };
        self.verify_user(txn, ctx, &user, secret).await
    }

    /// Id lookup first, then login lookup; a supplied login always decides the
    /// result, even when it finds nothing.
    pub async fn resolve(
        txn: &DatabaseTransaction,
        query: &CredentialQuery,
    ) -> Result<Option<auth_users::Model>, AuthError> {
        let users = UserRepository::new(txn);

        let mut user = None;
        if let Some(id) = query.id {
            user = users.get_by_id(id).await?;
        }
        if let Some(login) = query.login.as_deref() {
            user = users.get_by_login(login).await?;
        }

        Ok(user)
    }

    /// Compares `secret` against `user`'s stored hash, consulting the fallback
    /// on mismatch or undecodable hash.
    pub async fn verify_user(
        &self,
        txn: &DatabaseTransaction,
        ctx: &AuthContext,
        user: &auth_users::Model,
        secret: &str,
    ) -> Result<bool, AuthError> {
        let outcome = self
            .hasher
            .check_blocking(secret.to_string(), user.password_hash.clone())
            .await?;

        if outcome == Verification::Match {
            return Ok(true);
        }

        let Some(fallback) = &self.fallback else {
            debug!(user_id = user.id, ?outcome, "Password rejected");
            return Ok(false);
        };

        debug!(user_id = user.id, ?outcome, "Consulting fallback authenticator");
        fallback.check(txn, ctx, user, secret).await
    }
}
