//! Group command handlers

use crate::domain::IdentityId;
use crate::state::AppState;

pub async fn cmd_group_add(state: &AppState, name: &str, description: &str) -> anyhow::Result<()> {
    let group = state.auth.create_group(name, description).await?;
    println!("✓ Created group {} (ID: {})", group.name, group.id);
    Ok(())
}

pub async fn cmd_group_list(state: &AppState) -> anyhow::Result<()> {
    let groups = state.auth.list_groups().await?;

    if groups.is_empty() {
        println!("No groups defined.");
        println!();
        println!("Create the defaults with: gatekeep provision");
        return Ok(());
    }

    println!("Groups ({} total)", groups.len());
    println!("{:-<70}", "");
    for group in groups {
        if group.description.is_empty() {
            println!("• {} (ID: {})", group.name, group.id);
        } else {
            println!("• {} (ID: {}) - {}", group.name, group.id, group.description);
        }
    }

    Ok(())
}

pub async fn cmd_group_grant(state: &AppState, identity: i32, group: &str) -> anyhow::Result<()> {
    if state
        .auth
        .grant_group(IdentityId::new(identity), group)
        .await?
    {
        println!("✓ Identity {identity} added to {group}");
    } else {
        println!("Identity {identity} is already in {group}");
    }
    Ok(())
}

pub async fn cmd_group_revoke(state: &AppState, identity: i32, group: &str) -> anyhow::Result<()> {
    if state
        .auth
        .revoke_group(IdentityId::new(identity), group)
        .await?
    {
        println!("✓ Identity {identity} removed from {group}");
    } else {
        println!("Identity {identity} was not in {group}");
    }
    Ok(())
}
