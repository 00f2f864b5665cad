pub mod prelude;

pub mod auth_auth_groups;
pub mod auth_groups;
pub mod auth_id;
pub mod auth_profiles;
pub mod auth_user_log;
pub mod auth_users;
pub mod sea_orm_active_enums;
