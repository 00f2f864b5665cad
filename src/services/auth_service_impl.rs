//! `SeaORM` implementation of the `AuthService` trait.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{DatabaseTransaction, DbErr};
use tracing::{info, warn};

use crate::auth::error::is_unique_violation;
use crate::auth::{CredentialVerifier, HashedCredential, ProfileKind};
use crate::config::SecurityConfig;
use crate::db::repositories::group::GroupRepository;
use crate::db::repositories::identity::IdentityRepository;
use crate::db::repositories::user::UserRepository;
use crate::db::repositories::user_log::UserLogRepository;
use crate::db::{LOCAL_PROVIDER, NewUser, Store, UserRecord};
use crate::domain::{
    ActiveState, AuthContext, CredentialQuery, GroupId, IdentityId, UserEvent, UserId,
};
use crate::entities::{auth_user_log, auth_users};
use crate::services::auth_service::{
    AuthError, AuthService, CredentialRequest, GroupInfo, IdentityInfo, LoginResult,
    RegisteredIdentity, Registration,
};

pub struct SeaOrmAuthService {
    store: Store,
    verifier: CredentialVerifier,
    profile: Option<Arc<dyn ProfileKind>>,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub fn new(
        store: Store,
        verifier: CredentialVerifier,
        profile: Option<Arc<dyn ProfileKind>>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            store,
            verifier,
            profile,
            security,
        }
    }

    fn client_ip(ctx: &AuthContext) -> Result<IpAddr, AuthError> {
        ctx.remote_addr().ok_or_else(|| {
            AuthError::Validation("client IP address is required to record the event".to_string())
        })
    }

    fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        if password.chars().count() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }

    async fn hash(&self, password: &str) -> Result<HashedCredential, AuthError> {
        self.verifier
            .hasher()
            .hash_blocking(password.to_string())
            .await
    }

    async fn require_user(
        txn: &DatabaseTransaction,
        id: UserId,
    ) -> Result<auth_users::Model, AuthError> {
        UserRepository::new(txn)
            .get_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    async fn require_group(
        txn: &DatabaseTransaction,
        name: &str,
    ) -> Result<GroupId, AuthError> {
        GroupRepository::new(txn)
            .get_by_name(name)
            .await?
            .map(|g| GroupId::new(g.id))
            .ok_or_else(|| AuthError::GroupNotFound(name.to_string()))
    }

    async fn require_identity(txn: &DatabaseTransaction, id: IdentityId) -> Result<(), AuthError> {
        IdentityRepository::new(txn)
            .get(id)
            .await?
            .map(|_| ())
            .ok_or(AuthError::IdentityNotFound)
    }

    async fn ensure_login_free(
        txn: &DatabaseTransaction,
        provider: &str,
        login: &str,
    ) -> Result<(), AuthError> {
        if UserRepository::new(txn)
            .get_by_provider_login(provider, login)
            .await?
            .is_some()
        {
            return Err(AuthError::Conflict(format!(
                "login '{login}' is already registered for provider '{provider}'"
            )));
        }
        Ok(())
    }
}

/// Maps a repository failure to `Conflict` when it was a unique violation.
fn conflict_or_internal(err: anyhow::Error, what: &str) -> AuthError {
    if err.downcast_ref::<DbErr>().is_some_and(is_unique_violation) {
        AuthError::Conflict(format!("{what} already exists"))
    } else {
        AuthError::from(err)
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn check(
        &self,
        ctx: &AuthContext,
        query: &CredentialQuery,
        secret: &str,
    ) -> Result<bool, AuthError> {
        self.verifier
            .check(&self.store.conn, ctx, query, secret)
            .await
    }

    async fn login(
        &self,
        ctx: &AuthContext,
        login: &str,
        secret: &str,
    ) -> Result<LoginResult, AuthError> {
        let ip = Self::client_ip(ctx)?;
        let txn = self.store.begin().await?;

        let query = CredentialQuery::by_login(login);
        let user = CredentialVerifier::resolve(&txn, &query)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        // A fallback may upgrade the stored hash inside `txn`. Every early
        // return below drops `txn` uncommitted, so retired credentials keep
        // their legacy hash.
        if !self.verifier.verify_user(&txn, ctx, &user, secret).await? {
            return Err(AuthError::InvalidCredentials);
        }

        if user.active != ActiveState::Active {
            return Err(AuthError::IdentityInactive(user.active));
        }

        let identity_id = user
            .auth_id
            .map(IdentityId::new)
            .ok_or(AuthError::IdentityNotFound)?;
        let identity = IdentityRepository::new(&txn)
            .get(identity_id)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        if identity.active != ActiveState::Active {
            return Err(AuthError::IdentityInactive(identity.active));
        }

        // Re-read in case a fallback rewrote the row.
        let user = Self::require_user(&txn, UserId::new(user.id)).await?;

        UserLogRepository::new(&txn)
            .append(Some(identity_id), Some(UserId::new(user.id)), ip, UserEvent::Login)
            .await?;

        let groups: Vec<String> = GroupRepository::new(&txn)
            .groups_for(identity_id)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect();

        txn.commit().await?;

        info!(user_id = user.id, auth_id = identity.id, "Login succeeded");

        Ok(LoginResult {
            identity: identity_id,
            display_name: identity.display_name,
            user: UserRecord::from(user),
            groups: groups.join(","),
        })
    }

    async fn register(
        &self,
        ctx: &AuthContext,
        registration: Registration,
    ) -> Result<RegisteredIdentity, AuthError> {
        let ip = Self::client_ip(ctx)?;

        let login = registration.login.trim().to_string();
        if login.is_empty() {
            return Err(AuthError::Validation("Login cannot be empty".to_string()));
        }
        let provider = registration
            .provider
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(LOCAL_PROVIDER)
            .to_string();

        let password_hash = match registration.password.as_deref() {
            Some(password) => {
                self.validate_password(password)?;
                Some(self.hash(password).await?)
            }
            None => None,
        };

        let txn = self.store.begin().await?;
        Self::ensure_login_free(&txn, &provider, &login).await?;

        let display_name = registration
            .display_name
            .unwrap_or_else(|| login.clone());
        let identity = IdentityRepository::new(&txn).create(&display_name).await?;
        let identity_id = IdentityId::new(identity.id);

        let user = UserRepository::new(&txn)
            .create(NewUser {
                auth_id: Some(identity_id),
                provider,
                login,
                email: registration.email.trim().to_string(),
                password_hash,
            })
            .await
            .map_err(|e| conflict_or_internal(e, "credential"))?;

        for group in &registration.groups {
            let group_id = Self::require_group(&txn, group).await?;
            GroupRepository::new(&txn)
                .add_member(identity_id, group_id)
                .await?;
        }

        UserLogRepository::new(&txn)
            .append(Some(identity_id), Some(UserId::new(user.id)), ip, UserEvent::Register)
            .await?;

        txn.commit().await?;

        info!(user_id = user.id, auth_id = identity.id, "Registered identity");

        Ok(RegisteredIdentity {
            identity: identity_id,
            user: UserRecord::from(user),
        })
    }

    async fn link_credential(
        &self,
        _ctx: &AuthContext,
        identity: IdentityId,
        request: CredentialRequest,
    ) -> Result<UserRecord, AuthError> {
        let provider = request.provider.trim().to_string();
        let login = request.login.trim().to_string();
        if provider.is_empty() || login.is_empty() {
            return Err(AuthError::Validation(
                "Provider and login are required".to_string(),
            ));
        }

        let password_hash = match request.password.as_deref() {
            Some(password) => {
                self.validate_password(password)?;
                Some(self.hash(password).await?)
            }
            None => None,
        };

        let txn = self.store.begin().await?;
        Self::require_identity(&txn, identity).await?;
        Self::ensure_login_free(&txn, &provider, &login).await?;

        let user = UserRepository::new(&txn)
            .create(NewUser {
                auth_id: Some(identity),
                provider,
                login,
                email: request.email.trim().to_string(),
                password_hash,
            })
            .await
            .map_err(|e| conflict_or_internal(e, "credential"))?;

        txn.commit().await?;

        info!(user_id = user.id, auth_id = %identity, provider = %user.provider, "Linked credential");
        Ok(UserRecord::from(user))
    }

    async fn change_password(
        &self,
        ctx: &AuthContext,
        user: UserId,
        current: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let ip = Self::client_ip(ctx)?;
        self.validate_password(new_password)?;

        if current == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let txn = self.store.begin().await?;
        let model = Self::require_user(&txn, user).await?;

        if !self.verifier.verify_user(&txn, ctx, &model, current).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let hash = self.hash(new_password).await?;
        UserRepository::new(&txn).set_password_hash(user, &hash).await?;
        UserLogRepository::new(&txn)
            .append(model.auth_id.map(IdentityId::new), Some(user), ip, UserEvent::PasswordChange)
            .await?;

        txn.commit().await?;

        info!(user_id = %user, "Password changed");
        Ok(())
    }

    async fn reset_password(
        &self,
        ctx: &AuthContext,
        user: UserId,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let ip = Self::client_ip(ctx)?;
        self.validate_password(new_password)?;
        let hash = self.hash(new_password).await?;

        let txn = self.store.begin().await?;
        let model = Self::require_user(&txn, user).await?;

        UserRepository::new(&txn).set_password_hash(user, &hash).await?;
        UserLogRepository::new(&txn)
            .append(model.auth_id.map(IdentityId::new), Some(user), ip, UserEvent::Forgot)
            .await?;

        txn.commit().await?;

        info!(user_id = %user, "Password reset");
        Ok(())
    }

    async fn record_event(
        &self,
        ctx: &AuthContext,
        user: UserId,
        event: UserEvent,
    ) -> Result<(), AuthError> {
        let ip = Self::client_ip(ctx)?;
        let txn = self.store.begin().await?;
        let model = Self::require_user(&txn, user).await?;

        UserLogRepository::new(&txn)
            .append(model.auth_id.map(IdentityId::new), Some(user), ip, event)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    async fn set_identity_state(
        &self,
        identity: IdentityId,
        state: ActiveState,
    ) -> Result<(), AuthError> {
        let txn = self.store.begin().await?;
        if !IdentityRepository::new(&txn).set_state(identity, state).await? {
            return Err(AuthError::IdentityNotFound);
        }
        txn.commit().await?;

        if state == ActiveState::Active {
            info!(auth_id = %identity, "Identity reactivated");
        } else {
            warn!(auth_id = %identity, %state, "Identity retired");
        }
        Ok(())
    }

    async fn identity_info(&self, identity: IdentityId) -> Result<IdentityInfo, AuthError> {
        let txn = self.store.begin().await?;

        let model = IdentityRepository::new(&txn)
            .get(identity)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        let credentials = UserRepository::new(&txn)
            .list_for_identity(identity)
            .await?
            .into_iter()
            .map(UserRecord::from)
            .collect();

        let groups = GroupRepository::new(&txn)
            .groups_for(identity)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect();

        let last_login = UserLogRepository::new(&txn).latest(identity).await?;

        txn.commit().await?;

        Ok(IdentityInfo {
            id: identity,
            display_name: model.display_name,
            active: model.active,
            created: model.created,
            credentials,
            groups,
            last_login,
        })
    }

    async fn in_group(&self, identity: IdentityId, group: &str) -> Result<bool, AuthError> {
        Ok(self.store.in_group(identity, group).await?)
    }

    async fn group_list(&self, identity: IdentityId) -> Result<String, AuthError> {
        Ok(self.store.group_list(identity).await?)
    }

    async fn create_group(&self, name: &str, description: &str) -> Result<GroupInfo, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("Group name cannot be empty".to_string()));
        }

        let txn = self.store.begin().await?;
        let group = GroupRepository::new(&txn)
            .create(name, description)
            .await
            .map_err(|e| conflict_or_internal(e, &format!("group '{name}'")))?;
        txn.commit().await?;

        info!(group = %group.name, "Created group");
        Ok(GroupInfo::from(group))
    }

    async fn list_groups(&self) -> Result<Vec<GroupInfo>, AuthError> {
        Ok(self
            .store
            .list_groups()
            .await?
            .into_iter()
            .map(GroupInfo::from)
            .collect())
    }

    async fn grant_group(&self, identity: IdentityId, group: &str) -> Result<bool, AuthError> {
        let txn = self.store.begin().await?;
        Self::require_identity(&txn, identity).await?;
        let group_id = Self::require_group(&txn, group).await?;
        let added = GroupRepository::new(&txn)
            .add_member(identity, group_id)
            .await?;
        txn.commit().await?;
        Ok(added)
    }

    async fn revoke_group(&self, identity: IdentityId, group: &str) -> Result<bool, AuthError> {
        let txn = self.store.begin().await?;
        let group_id = Self::require_group(&txn, group).await?;
        let removed = GroupRepository::new(&txn)
            .remove_member(identity, group_id)
            .await?;
        txn.commit().await?;
        Ok(removed)
    }

    async fn login_history(
        &self,
        identity: IdentityId,
        limit: u64,
    ) -> Result<Vec<auth_user_log::Model>, AuthError> {
        Ok(self.store.login_history(identity, limit).await?)
    }

    async fn get_profile(
        &self,
        ctx: &AuthContext,
        identity: IdentityId,
    ) -> Result<Option<serde_json::Value>, AuthError> {
        let Some(kind) = &self.profile else {
            return Ok(None);
        };

        // The profile write opens the transaction; reads come after it.
        let txn = self.store.begin().await?;
        let profile = match kind.get_or_create(&txn, ctx, identity).await {
            Ok(profile) => profile,
            Err(err) => {
                txn.rollback().await?;
                if self.store.get_identity(identity).await?.is_none() {
                    return Err(AuthError::IdentityNotFound);
                }
                return Err(err);
            }
        };
        Self::require_identity(&txn, identity).await?;
        txn.commit().await?;

        Ok(Some(profile))
    }
}
