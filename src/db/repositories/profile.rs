use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    Set, TryInsertResult, sea_query::OnConflict,
};
use tracing::debug;

use crate::domain::IdentityId;
use crate::entities::{auth_profiles, prelude::*};

/// Returns the `E` row owned by `auth_id`, inserting `blank` first if none exists.
///
/// The insert is issued before any read with `ON CONFLICT(owner) DO NOTHING`,
/// so a caller that loses the race sees zero rows affected and re-reads the
/// winner's row. Inside a transaction this must be the first statement: SQLite
/// refuses to upgrade a read snapshot to a write lock while another writer is
/// active, but it waits on a transaction whose first statement is a write.
pub async fn get_or_create<E, C>(
    conn: &C,
    owner: E::Column,
    auth_id: IdentityId,
    blank: E::ActiveModel,
) -> Result<E::Model>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel>,
    E::ActiveModel: ActiveModelTrait<Entity = E> + Send,
    C: ConnectionTrait,
{
    let outcome = E::insert(blank)
        .on_conflict(OnConflict::column(owner).do_nothing().to_owned())
        .do_nothing()
        .exec_without_returning(conn)
        .await
        .context("Failed to create profile")?;

    if !matches!(outcome, TryInsertResult::Inserted(n) if n > 0) {
        debug!(auth_id = auth_id.value(), "Profile already present");
    }

    E::find()
        .filter(owner.eq(auth_id.value()))
        .one(conn)
        .await
        .context("Failed to read profile")?
        .ok_or_else(|| anyhow::anyhow!("Profile for identity {auth_id} vanished after insert"))
}

pub struct ProfileRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ProfileRepository<'a, C> {
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub async fn get(&self, auth_id: IdentityId) -> Result<Option<auth_profiles::Model>> {
        AuthProfiles::find()
            .filter(auth_profiles::Column::AuthId.eq(auth_id.value()))
            .one(self.conn)
            .await
            .context("Failed to query profile")
    }

    pub async fn get_or_create(&self, auth_id: IdentityId) -> Result<auth_profiles::Model> {
        get_or_create::<AuthProfiles, C>(
            self.conn,
            auth_profiles::Column::AuthId,
            auth_id,
            Self::blank(auth_id),
        )
        .await
    }

    fn blank(auth_id: IdentityId) -> auth_profiles::ActiveModel {
        auth_profiles::ActiveModel {
            auth_id: Set(auth_id.value()),
            full_name: Set(None),
            timezone: Set(None),
            created: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
    }
}
