//! Identity command handlers

use crate::domain::{ActiveState, IdentityId};
use crate::state::AppState;

pub async fn cmd_identity_show(state: &AppState, id: i32) -> anyhow::Result<()> {
    let info = state.auth.identity_info(IdentityId::new(id)).await?;

    println!("Identity: {} (ID: {})", info.display_name, info.id);
    println!("{:-<70}", "");
    println!("State: {} | Created: {}", info.active, info.created);
    println!(
        "Groups: {}",
        if info.groups.is_empty() {
            "-".to_string()
        } else {
            info.groups.join(", ")
        }
    );
    match &info.last_login {
        Some(entry) => println!(
            "Last activity: {} {} from {}",
            entry.event, entry.time, entry.ip_addr
        ),
        None => println!("Last activity: never"),
    }

    println!();
    println!("Credentials:");
    for user in &info.credentials {
        println!(
            "  {}. {}:{} [{}]{}",
            user.id,
            user.provider,
            user.login,
            user.active,
            if user.has_password { "" } else { " (no password)" }
        );
    }

    Ok(())
}

pub async fn cmd_identity_state(state: &AppState, id: i32, new_state: ActiveState) -> anyhow::Result<()> {
    state
        .auth
        .set_identity_state(IdentityId::new(id), new_state)
        .await?;
    println!("✓ Identity {id} is now {new_state}");
    Ok(())
}
