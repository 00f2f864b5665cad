pub use super::auth_auth_groups::Entity as AuthAuthGroups;
pub use super::auth_groups::Entity as AuthGroups;
pub use super::auth_id::Entity as AuthId;
pub use super::auth_profiles::Entity as AuthProfiles;
pub use super::auth_user_log::Entity as AuthUserLog;
pub use super::auth_users::Entity as AuthUsers;
