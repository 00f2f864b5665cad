use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};

use crate::domain::{ActiveState, IdentityId};
use crate::entities::{auth_id, prelude::*};

pub struct IdentityRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> IdentityRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, id: IdentityId) -> Result<Option<auth_id::Model>> {
        AuthId::find_by_id(id.value())
            .one(self.conn)
            .await
            .context("Failed to query identity by ID")
    }

    pub async fn create(&self, display_name: &str) -> Result<auth_id::Model> {
        let active = auth_id::ActiveModel {
            display_name: Set(display_name.to_string()),
            active: Set(ActiveState::Active),
            created: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        active
            .insert(self.conn)
            .await
            .context("Failed to create identity")
    }

    /// Soft-retires or reactivates an identity. Returns false if it does not exist.
    pub async fn set_state(&self, id: IdentityId, state: ActiveState) -> Result<bool> {
        let result = AuthId::update_many()
            .col_expr(auth_id::Column::Active, Expr::value(state))
            .filter(auth_id::Column::Id.eq(id.value()))
            .exec(self.conn)
            .await
            .context("Failed to update identity state")?;

        Ok(result.rows_affected > 0)
    }
}
