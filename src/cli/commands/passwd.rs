//! Password change command handler

use std::net::IpAddr;

use super::read_secret;
use crate::domain::UserId;
use crate::state::AppState;

pub async fn cmd_passwd(state: &AppState, user: i32, reset: bool, ip: IpAddr) -> anyhow::Result<()> {
    let user = UserId::new(user);
    let ctx = state.context_from(ip);

    let current = if reset {
        None
    } else {
        Some(read_secret("Current password: ")?)
    };

    let new_password = read_secret("New password: ")?;
    if read_secret("Repeat new password: ")? != new_password {
        anyhow::bail!("Passwords do not match");
    }

    match current {
        Some(current) => {
            state
                .auth
                .change_password(&ctx, user, &current, &new_password)
                .await?;
            println!("✓ Password changed for credential {user}");
        }
        None => {
            state.auth.reset_password(&ctx, user, &new_password).await?;
            println!("✓ Password reset for credential {user}");
        }
    }

    Ok(())
}
