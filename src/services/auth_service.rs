//! Domain service for authentication and identity management.
//!
//! Handles credential checks, login, registration, provider linking, password
//! changes, group membership and profiles. Every operation runs in one
//! transaction that commits on success and rolls back on any error.

use serde::Serialize;

use crate::db::UserRecord;
use crate::domain::{ActiveState, AuthContext, CredentialQuery, GroupId, IdentityId, UserEvent, UserId};
use crate::entities::{auth_groups, auth_user_log};

pub use crate::auth::AuthError;

/// Group DTO for responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupInfo {
    pub id: GroupId,
    pub name: String,
    pub description: String,
}

impl From<auth_groups::Model> for GroupInfo {
    fn from(model: auth_groups::Model) -> Self {
        Self {
            id: GroupId::new(model.id),
            name: model.name,
            description: model.description,
        }
    }
}

/// Identity overview: the person, their credentials, groups and last event.
#[derive(Debug, Clone, Serialize)]
pub struct IdentityInfo {
    pub id: IdentityId,
    pub display_name: String,
    pub active: ActiveState,
    pub created: String,
    pub credentials: Vec<UserRecord>,
    pub groups: Vec<String>,
    pub last_login: Option<auth_user_log::Model>,
}

/// Input for creating a new identity with its first credential.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub login: String,
    /// Absent for external providers that never store a local secret.
    pub password: Option<String>,
    pub email: String,
    /// Defaults to the login.
    pub display_name: Option<String>,
    /// Defaults to `local`.
    pub provider: Option<String>,
    /// Groups to join; each must already exist.
    pub groups: Vec<String>,
}

/// Input for attaching another provider binding to an existing identity.
#[derive(Debug, Clone, Default)]
pub struct CredentialRequest {
    pub provider: String,
    pub login: String,
    pub email: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisteredIdentity {
    pub identity: IdentityId,
    pub user: UserRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub identity: IdentityId,
    pub display_name: String,
    pub user: UserRecord,
    pub groups: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Pure credential check: never records an event.
    async fn check(
        &self,
        ctx: &AuthContext,
        query: &CredentialQuery,
        secret: &str,
    ) -> Result<bool, AuthError>;

    /// Checks credentials, requires an active identity and appends a login event.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the check fails and
    /// [`AuthError::IdentityInactive`] for disabled or deleted identities.
    async fn login(
        &self,
        ctx: &AuthContext,
        login: &str,
        secret: &str,
    ) -> Result<LoginResult, AuthError>;

    async fn register(
        &self,
        ctx: &AuthContext,
        registration: Registration,
    ) -> Result<RegisteredIdentity, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] if the provider/login pair is taken.
    async fn link_credential(
        &self,
        ctx: &AuthContext,
        identity: IdentityId,
        request: CredentialRequest,
    ) -> Result<UserRecord, AuthError>;

    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if `current` does not verify.
    async fn change_password(
        &self,
        ctx: &AuthContext,
        user: UserId,
        current: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Forgot-password completion: sets a new secret without the old one.
    async fn reset_password(
        &self,
        ctx: &AuthContext,
        user: UserId,
        new_password: &str,
    ) -> Result<(), AuthError>;

    /// Appends an audit entry for a flow completed by the caller.
    async fn record_event(
        &self,
        ctx: &AuthContext,
        user: UserId,
        event: UserEvent,
    ) -> Result<(), AuthError>;

    async fn set_identity_state(
        &self,
        identity: IdentityId,
        state: ActiveState,
    ) -> Result<(), AuthError>;

    async fn identity_info(&self, identity: IdentityId) -> Result<IdentityInfo, AuthError>;

    async fn in_group(&self, identity: IdentityId, group: &str) -> Result<bool, AuthError>;

    async fn group_list(&self, identity: IdentityId) -> Result<String, AuthError>;

    async fn create_group(&self, name: &str, description: &str) -> Result<GroupInfo, AuthError>;

    async fn list_groups(&self) -> Result<Vec<GroupInfo>, AuthError>;

    /// Returns false if the identity was already a member.
    async fn grant_group(&self, identity: IdentityId, group: &str) -> Result<bool, AuthError>;

    /// Returns false if the identity was not a member.
    async fn revoke_group(&self, identity: IdentityId, group: &str) -> Result<bool, AuthError>;

    async fn login_history(
        &self,
        identity: IdentityId,
        limit: u64,
    ) -> Result<Vec<auth_user_log::Model>, AuthError>;

    /// Returns the configured profile record, creating it on first access.
    /// `None` when no profile kind is configured.
    async fn get_profile(
        &self,
        ctx: &AuthContext,
        identity: IdentityId,
    ) -> Result<Option<serde_json::Value>, AuthError>;
}
