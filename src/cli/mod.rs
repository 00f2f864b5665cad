//! CLI module - Command-line administration for Gatekeep
//!
//! This module provides a structured CLI using clap for argument parsing.
//! Secrets are never taken from argv; commands that need one prompt on stdin.

mod commands;

use std::net::IpAddr;

use clap::{Parser, Subcommand};

use crate::domain::ActiveState;

/// Gatekeep - identity and credential store
#[derive(Parser)]
#[command(name = "gatekeep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create the configured default groups
    Provision,

    /// Register a new identity with its first credential
    #[command(alias = "add")]
    Register {
        /// Login name
        login: String,
        /// Contact email
        #[arg(long, default_value = "")]
        email: String,
        /// Display name (defaults to the login)
        #[arg(long)]
        name: Option<String>,
        /// Provider the login belongs to
        #[arg(long)]
        provider: Option<String>,
        /// Group to join (repeatable)
        #[arg(long = "group")]
        groups: Vec<String>,
        /// Skip the password prompt (external providers)
        #[arg(long)]
        no_password: bool,
        /// Client address recorded in the audit log
        #[arg(long, default_value = "127.0.0.1")]
        ip: IpAddr,
    },

    /// Attach another provider login to an identity
    Link {
        /// Identity ID
        identity: i32,
        /// Provider name
        provider: String,
        /// Login at that provider
        login: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Prompt for a local password for this binding
        #[arg(long)]
        with_password: bool,
    },

    /// Verify a password without recording anything
    #[command(alias = "c")]
    Check {
        /// Login name
        login: Option<String>,
        /// Credential ID, used when no login is given
        #[arg(long)]
        id: Option<i32>,
    },

    /// Verify a password and record a login event
    Login {
        login: String,
        #[arg(long, default_value = "127.0.0.1")]
        ip: IpAddr,
    },

    /// Change or reset a credential's password
    Passwd {
        /// Credential ID
        user: i32,
        /// Set a new password without the current one
        #[arg(long)]
        reset: bool,
        #[arg(long, default_value = "127.0.0.1")]
        ip: IpAddr,
    },

    /// Manage groups
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Inspect or retire identities
    Identity {
        #[command(subcommand)]
        command: IdentityCommands,
    },

    /// Show the audit log of an identity
    #[command(alias = "h")]
    History {
        /// Identity ID
        identity: i32,
        /// Number of entries to show
        #[arg(default_value = "10")]
        limit: u64,
    },

    /// Show (creating if needed) the profile record of an identity
    Profile {
        /// Identity ID
        identity: i32,
    },
}

#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create a group
    Add {
        name: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// List all groups
    #[command(alias = "ls")]
    List,
    /// Add an identity to a group
    Grant { identity: i32, group: String },
    /// Remove an identity from a group
    #[command(alias = "rm")]
    Revoke { identity: i32, group: String },
}

#[derive(Subcommand)]
pub enum IdentityCommands {
    /// Show an identity with its credentials and groups
    Show { id: i32 },
    /// Set the state: active, disabled or deleted
    State { id: i32, state: ActiveState },
}

pub use commands::*;
