use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::sea_orm_active_enums::UserEvent;

/// Append-only audit trail of authentication events.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "auth_user_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub auth_id: Option<i32>,
    pub user_id: Option<i32>,
    pub time: String,
    #[sea_orm(column_type = "String(StringLen::N(39))")]
    pub ip_addr: String,
    pub event: UserEvent,
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
    #[sea_orm(
        belongs_to = "super::auth_users::Entity",
        from = "Column::UserId",
        to = "super::auth_users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    AuthUsers,
}

impl Related<super::auth_id::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthId.def()
    }
}

impl Related<super::auth_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthUsers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
