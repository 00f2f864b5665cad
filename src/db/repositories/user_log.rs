use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::net::IpAddr;

use crate::domain::{IdentityId, UserEvent, UserId};
use crate::entities::{auth_user_log, prelude::*};

/// Append-only access to `auth_user_log`.
pub struct UserLogRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> UserLogRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn append(
        &self,
        auth_id: Option<IdentityId>,
        user_id: Option<UserId>,
        ip_addr: IpAddr,
        event: UserEvent,
    ) -> Result<auth_user_log::Model> {
        let entry = auth_user_log::ActiveModel {
            auth_id: Set(auth_id.map(IdentityId::value)),
            user_id: Set(user_id.map(UserId::value)),
            time: Set(chrono::Utc::now().to_rfc3339()),
            ip_addr: Set(ip_addr.to_string()),
            event: Set(event),
            ..Default::default()
        };

        entry
            .insert(self.conn)
            .await
            .context("Failed to append auth log entry")
    }

    /// Most recent entry of any kind for the identity.
    pub async fn latest(&self, auth_id: IdentityId) -> Result<Option<auth_user_log::Model>> {
        AuthUserLog::find()
            .filter(auth_user_log::Column::AuthId.eq(auth_id.value()))
            .order_by_desc(auth_user_log::Column::Id)
            .one(self.conn)
            .await
            .context("Failed to query latest auth log entry")
    }

    /// Chronological history, oldest first, capped at `limit` newest entries.
    pub async fn history(&self, auth_id: IdentityId, limit: u64) -> Result<Vec<auth_user_log::Model>> {
        let mut rows = AuthUserLog::find()
            .filter(auth_user_log::Column::AuthId.eq(auth_id.value()))
            .order_by_desc(auth_user_log::Column::Id)
            .limit(limit)
            .all(self.conn)
            .await
            .context("Failed to query auth log history")?;

        rows.reverse();
        Ok(rows)
    }
}
