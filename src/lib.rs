pub mod auth;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod entities;
pub mod services;
pub mod state;

use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, GroupCommands, IdentityCommands};
pub use config::Config;
use state::AppState;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if matches!(command, Commands::Init) {
        return cmd_init();
    }

    let state = AppState::new(config).await?;

    match command {
        Commands::Init => cmd_init(),

        Commands::Provision => cli::cmd_provision(&state).await,

        Commands::Register {
            login,
            email,
            name,
            provider,
            groups,
            no_password,
            ip,
        } => {
            cli::cmd_register(
                &state,
                cli::RegisterArgs {
                    login,
                    email,
                    name,
                    provider,
                    groups,
                    no_password,
                    ip,
                },
            )
            .await
        }

        Commands::Link {
            identity,
            provider,
            login,
            email,
            with_password,
        } => cli::cmd_link(&state, identity, provider, login, email, with_password).await,

        Commands::Check { login, id } => cli::cmd_check(&state, login, id).await,

        Commands::Login { login, ip } => cli::cmd_login(&state, &login, ip).await,

        Commands::Passwd { user, reset, ip } => cli::cmd_passwd(&state, user, reset, ip).await,

        Commands::Group { command } => match command {
            GroupCommands::Add { name, description } => {
                cli::cmd_group_add(&state, &name, &description).await
            }
            GroupCommands::List => cli::cmd_group_list(&state).await,
            GroupCommands::Grant { identity, group } => {
                cli::cmd_group_grant(&state, identity, &group).await
            }
            GroupCommands::Revoke { identity, group } => {
                cli::cmd_group_revoke(&state, identity, &group).await
            }
        },

        Commands::Identity { command } => match command {
            IdentityCommands::Show { id } => cli::cmd_identity_show(&state, id).await,
            IdentityCommands::State { id, state: new_state } => {
                cli::cmd_identity_state(&state, id, new_state).await
            }
        },

        Commands::History { identity, limit } => cli::cmd_history(&state, identity, limit).await,

        Commands::Profile { identity } => cli::cmd_profile(&state, identity).await,
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        info!("Wrote gatekeep.toml");
        println!("✓ Created gatekeep.toml");
        println!("  Edit it, then run: gatekeep provision");
    } else {
        println!("gatekeep.toml already exists.");
    }
    Ok(())
}
