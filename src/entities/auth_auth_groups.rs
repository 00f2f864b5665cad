use sea_orm::entity::prelude::*;

/// Identity ↔ group membership. The composite key keeps each pair unique.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "auth_auth_groups")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub auth_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub group_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::auth_id::Entity",
        from = "Column::AuthId",
        to = "super::auth_id::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    AuthId,
    #[sea_orm(
        belongs_to = "super::auth_groups::Entity",
        from = "Column::GroupId",
        to = "super::auth_groups::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    AuthGroups,
}

impl Related<super::auth_id::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthId.def()
    }
}

impl Related<super::auth_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
