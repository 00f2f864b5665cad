//! Provision command handler

use crate::state::AppState;

pub async fn cmd_provision(state: &AppState) -> anyhow::Result<()> {
    let report = state.provision().await?;

    for name in &report.created {
        println!("✓ Created group: {name}");
    }
    for name in &report.existing {
        println!("• Already present: {name}");
    }

    Ok(())
}
