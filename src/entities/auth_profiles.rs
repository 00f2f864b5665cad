use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Built-in per-identity profile record.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "auth_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub auth_id: i32,

    pub full_name: Option<String>,

    pub timezone: Option<String>,

    pub created: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::auth_id::Entity",
        from = "Column::AuthId",
        to = "super::auth_id::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    AuthId,
}

impl Related<super::auth_id::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthId.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
