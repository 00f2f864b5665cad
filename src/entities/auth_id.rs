use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::ActiveState;

/// One logical person, independent of how they log in.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "auth_id")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "String(StringLen::N(80))")]
    pub display_name: String,

    pub active: ActiveState,

    pub created: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::auth_users::Entity")]
    AuthUsers,
    #[sea_orm(has_many = "super::auth_user_log::Entity")]
    AuthUserLog,
    #[sea_orm(has_many = "super::auth_auth_groups::Entity")]
    Memberships,
}

impl Related<super::auth_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthUsers.def()
    }
}

impl Related<super::auth_user_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthUserLog.def()
    }
}

impl Related<super::auth_auth_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::auth_groups::Entity> for Entity {
    fn to() -> RelationDef {
        super::auth_auth_groups::Relation::AuthGroups.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::auth_auth_groups::Relation::AuthId.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
