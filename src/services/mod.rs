pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{
    AuthError, AuthService, CredentialRequest, GroupInfo, IdentityInfo, LoginResult,
    RegisteredIdentity, Registration,
};
pub use auth_service_impl::SeaOrmAuthService;

pub mod provisioning;
pub use provisioning::{ProvisionReport, provision_groups};
