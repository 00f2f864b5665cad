//! First-start bootstrap of reference data.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AuthConfig;
use crate::db::Store;
use crate::db::repositories::group::GroupRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    pub created: Vec<String>,
    pub existing: Vec<String>,
}

/// Creates every configured group that does not exist yet, in one transaction.
///
/// Each seed is inserted with `ON CONFLICT(name) DO NOTHING` before anything is
/// read, so a name that already exists (or that a concurrent provisioner just
/// wrote) lands in `existing` instead of failing. Storage failures propagate.
pub async fn provision_groups(store: &Store, auth: &AuthConfig) -> Result<ProvisionReport> {
    let mut report = ProvisionReport::default();
    let txn = store.begin().await?;
    let groups = GroupRepository::new(&txn);

    for (name, description) in auth.group_seeds() {
        if groups.create_if_missing(&name, &description).await? {
            report.created.push(name);
        } else {
            debug!(group = %name, "Group already present");
            report.existing.push(name);
        }
    }

    txn.commit().await?;

    if !report.created.is_empty() {
        info!(groups = ?report.created, "Provisioned default groups");
    }

    Ok(report)
}
