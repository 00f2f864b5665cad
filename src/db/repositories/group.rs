use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TryInsertResult,
    sea_query::{JoinType, OnConflict},
};

use crate::domain::{GroupId, IdentityId};
use crate::entities::{auth_auth_groups, auth_groups, prelude::*};

pub struct GroupRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> GroupRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<auth_groups::Model>> {
        AuthGroups::find()
            .filter(auth_groups::Column::Name.eq(name))
            .one(self.conn)
            .await
            .context("Failed to query group by name")
    }

    pub async fn list(&self) -> Result<Vec<auth_groups::Model>> {
        AuthGroups::find()
            .order_by_asc(auth_groups::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to list groups")
    }

    /// Inserts a group. A duplicate name surfaces as a unique-constraint `DbErr`.
    pub async fn create(&self, name: &str, description: &str) -> Result<auth_groups::Model> {
        let active = auth_groups::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            ..Default::default()
        };

        Ok(active.insert(self.conn).await?)
    }

    /// Inserts a group unless one with the same name exists. Returns false when
    /// the name was already taken.
    pub async fn create_if_missing(&self, name: &str, description: &str) -> Result<bool> {
        let active = auth_groups::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            ..Default::default()
        };

        let outcome = AuthGroups::insert(active)
            .on_conflict(
                OnConflict::column(auth_groups::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .do_nothing()
            .exec_without_returning(self.conn)
            .await
            .context("Failed to create group")?;

        Ok(matches!(outcome, TryInsertResult::Inserted(n) if n > 0))
    }

    /// Groups the identity belongs to, in creation order.
    pub async fn groups_for(&self, auth_id: IdentityId) -> Result<Vec<auth_groups::Model>> {
        AuthGroups::find()
            .join(JoinType::InnerJoin, auth_groups::Relation::Memberships.def())
            .filter(auth_auth_groups::Column::AuthId.eq(auth_id.value()))
            .order_by_asc(auth_groups::Column::Id)
            .all(self.conn)
            .await
            .context("Failed to query group memberships")
    }

    pub async fn is_member(&self, auth_id: IdentityId, group_name: &str) -> Result<bool> {
        let count = AuthAuthGroups::find()
            .join(JoinType::InnerJoin, auth_auth_groups::Relation::AuthGroups.def())
            .filter(auth_auth_groups::Column::AuthId.eq(auth_id.value()))
            .filter(auth_groups::Column::Name.eq(group_name))
            .count(self.conn)
            .await
            .context("Failed to check group membership")?;

        Ok(count > 0)
    }

    /// Adds a membership. Returns false if the pair already existed.
    pub async fn add_member(&self, auth_id: IdentityId, group_id: GroupId) -> Result<bool> {
        let membership = auth_auth_groups::ActiveModel {
            auth_id: Set(auth_id.value()),
            group_id: Set(group_id.value()),
        };

        let outcome = AuthAuthGroups::insert(membership)
            .on_conflict_do_nothing()
            .exec_without_returning(self.conn)
            .await
            .context("Failed to add group membership")?;

        Ok(matches!(outcome, TryInsertResult::Inserted(n) if n > 0))
    }

    pub async fn remove_member(&self, auth_id: IdentityId, group_id: GroupId) -> Result<bool> {
        let result = AuthAuthGroups::delete_many()
            .filter(auth_auth_groups::Column::AuthId.eq(auth_id.value()))
            .filter(auth_auth_groups::Column::GroupId.eq(group_id.value()))
            .exec(self.conn)
            .await
            .context("Failed to remove group membership")?;

        Ok(result.rows_affected > 0)
    }
}
