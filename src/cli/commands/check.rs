//! Check and login command handlers

use std::net::IpAddr;

use super::read_secret;
use crate::domain::{CredentialQuery, UserId};
use crate::services::AuthError;
use crate::state::AppState;

pub async fn cmd_check(
    state: &AppState,
    login: Option<String>,
    id: Option<i32>,
) -> anyhow::Result<()> {
    let query = CredentialQuery {
        id: id.map(UserId::new),
        login,
    };
    if query.id.is_none() && query.login.is_none() {
        anyhow::bail!("Provide a login or --id");
    }

    let secret = read_secret("Password: ")?;
    if state.auth.check(&state.context(), &query, &secret).await? {
        println!("✓ Credentials valid");
    } else {
        println!("✗ Credentials invalid");
    }
    Ok(())
}

pub async fn cmd_login(state: &AppState, login: &str, ip: IpAddr) -> anyhow::Result<()> {
    let secret = read_secret("Password: ")?;

    match state.auth.login(&state.context_from(ip), login, &secret).await {
        Ok(result) => {
            println!("✓ Welcome, {}", result.display_name);
            println!(
                "  Identity: {} | Credential: {} | Groups: {}",
                result.identity,
                result.user.id,
                if result.groups.is_empty() {
                    "-"
                } else {
                    result.groups.as_str()
                }
            );
            Ok(())
        }
        Err(AuthError::InvalidCredentials) => {
            println!("✗ Invalid login or password");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
