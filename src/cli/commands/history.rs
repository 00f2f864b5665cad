use crate::domain::IdentityId;
use crate::state::AppState;

pub async fn cmd_history(state: &AppState, identity: i32, limit: u64) -> anyhow::Result<()> {
    let entries = state
        .auth
        .login_history(IdentityId::new(identity), limit)
        .await?;

    if entries.is_empty() {
        println!("No history for identity {identity}.");
        return Ok(());
    }

    println!("Recent Events (last {}):", entries.len());
    println!("{:-<70}", "");

    for entry in entries {
        let user = entry
            .user_id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        println!("• {} {} from {}", entry.time, entry.event, entry.ip_addr);
        println!("  Credential: {user}");
    }

    Ok(())
}
