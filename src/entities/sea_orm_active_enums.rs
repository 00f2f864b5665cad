use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state shared by identities and credentials.
///
/// Stored as a single character so existing `Y`/`N`/`D` data reads back unchanged.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
#[serde(rename_all = "lowercase")]
pub enum ActiveState {
    #[default]
    #[sea_orm(string_value = "Y")]
    Active,
    #[sea_orm(string_value = "N")]
    Disabled,
    #[sea_orm(string_value = "D")]
    Deleted,
}

impl ActiveState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::Deleted => "deleted",
        }
    }
}

impl std::str::FromStr for ActiveState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" | "y" => Ok(Self::Active),
            "disabled" | "n" => Ok(Self::Disabled),
            "deleted" | "d" => Ok(Self::Deleted),
            other => Err(format!("unknown state '{other}'")),
        }
    }
}

impl std::fmt::Display for ActiveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entry in the authentication audit log.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
#[serde(rename_all = "snake_case")]
pub enum UserEvent {
    #[default]
    #[sea_orm(string_value = "L")]
    Login,
    #[sea_orm(string_value = "R")]
    Register,
    #[sea_orm(string_value = "P")]
    PasswordChange,
    #[sea_orm(string_value = "F")]
    Forgot,
}

impl std::fmt::Display for UserEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::PasswordChange => "password_change",
            Self::Forgot => "forgot",
        };
        f.write_str(label)
    }
}
