use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "auth_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique, column_type = "String(StringLen::N(80))")]
    pub name: String,

    #[sea_orm(column_type = "String(StringLen::N(255))")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::auth_auth_groups::Entity")]
    Memberships,
}

impl Related<super::auth_auth_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Memberships.def()
    }
}

impl Related<super::auth_id::Entity> for Entity {
    fn to() -> RelationDef {
        super::auth_auth_groups::Relation::AuthId.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::auth_auth_groups::Relation::AuthGroups.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
