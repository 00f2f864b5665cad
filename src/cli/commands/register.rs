//! Register and link command handlers

use std::net::IpAddr;

use super::read_secret;
use crate::domain::IdentityId;
use crate::services::{CredentialRequest, Registration};
use crate::state::AppState;

pub struct RegisterArgs {
    pub login: String,
    pub email: String,
    pub name: Option<String>,
    pub provider: Option<String>,
    pub groups: Vec<String>,
    pub no_password: bool,
    pub ip: IpAddr,
}

pub async fn cmd_register(state: &AppState, args: RegisterArgs) -> anyhow::Result<()> {
    let password = if args.no_password {
        None
    } else {
        let first = read_secret("Password: ")?;
        let second = read_secret("Repeat password: ")?;
        if first != second {
            anyhow::bail!("Passwords do not match");
        }
        Some(first)
    };

    let ctx = state.context_from(args.ip);
    let registered = state
        .auth
        .register(
            &ctx,
            Registration {
                login: args.login,
                password,
                email: args.email,
                display_name: args.name,
                provider: args.provider,
                groups: args.groups,
            },
        )
        .await?;

    println!(
        "✓ Registered {} (identity {}, credential {})",
        registered.user.login, registered.identity, registered.user.id
    );
    Ok(())
}

pub async fn cmd_link(
    state: &AppState,
    identity: i32,
    provider: String,
    login: String,
    email: String,
    with_password: bool,
) -> anyhow::Result<()> {
    let password = if with_password {
        Some(read_secret("Password: ")?)
    } else {
        None
    };

    let user = state
        .auth
        .link_credential(
            &state.context(),
            IdentityId::new(identity),
            CredentialRequest {
                provider,
                login,
                email,
                password,
            },
        )
        .await?;

    println!(
        "✓ Linked {}:{} to identity {identity} (credential {})",
        user.provider, user.login, user.id
    );
    Ok(())
}
