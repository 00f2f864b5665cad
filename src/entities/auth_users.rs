use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::ActiveState;

/// One credential binding (provider + login) attached to an identity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "auth_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Null until the credential is linked to an identity.
    pub auth_id: Option<i32>,

    #[sea_orm(column_type = "String(StringLen::N(80))")]
    pub provider: String,

    #[sea_orm(column_type = "String(StringLen::N(80))")]
    pub login: String,

    /// Unused. The bcrypt encoding carries its own salt.
    #[sea_orm(column_type = "String(StringLen::N(40))")]
    pub salt: Option<String>,

    /// Encoded password hash. Empty when no password was ever set.
    #[sea_orm(column_name = "password", column_type = "String(StringLen::N(255))")]
    pub password_hash: String,

    #[sea_orm(column_type = "String(StringLen::N(80))")]
    pub email: String,

    pub created: String,

    pub active: ActiveState,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::auth_id::Entity",
        from = "Column::AuthId",
        to = "super::auth_id::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    AuthId,
    #[sea_orm(has_many = "super::auth_user_log::Entity")]
    AuthUserLog,
}

impl Related<super::auth_id::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthId.def()
    }
}

impl Related<super::auth_user_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthUserLog.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
