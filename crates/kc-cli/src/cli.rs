//! CLI argument parsing.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::config::OutputFormat;

/// Keycloak federation CLI - resolve, log in, and import users from a
/// read-only properties registry.
#[derive(Debug, Parser)]
#[command(name = "kc-federation")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ~/.keycloak/federation.toml).
    #[arg(short, long, env = "KC_FEDERATION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Registry file (overrides config).
    #[arg(short, long, env = "KC_USERS_FILE")]
    pub users_file: Option<PathBuf>,

    /// Local store snapshot file (overrides config).
    #[arg(short, long, env = "KC_STORE_FILE")]
    pub store: Option<PathBuf>,

    /// Realm (overrides config).
    #[arg(short, long, env = "KC_REALM")]
    pub realm: Option<String>,

    /// Output format (overrides config).
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a user against the registry.
    Lookup {
        /// Username, or composite id with --composite.
        id: String,

        /// Treat the id as `<provider>.<external id>`.
        #[arg(long)]
        composite: bool,
    },

    /// Validate a password, materializing the account on success.
    Login {
        /// Username.
        username: String,

        /// Password (will prompt if not provided).
        #[arg(long)]
        password: Option<String>,
    },

    /// Import every registry entry into the realm.
    Sync,

    /// Import entries changed since a point in time.
    SyncSince {
        /// RFC 3339 timestamp.
        since: DateTime<Utc>,
    },

    /// Realm management commands.
    #[command(subcommand)]
    Realm(RealmCommand),

    /// Role management commands.
    #[command(subcommand)]
    Role(RoleCommand),

    /// User management commands.
    #[command(subcommand)]
    User(UserCommand),
}

/// Realm commands.
#[derive(Debug, Subcommand)]
pub enum RealmCommand {
    /// List all realms.
    List,

    /// Create a new realm.
    Create {
        /// Realm name.
        name: String,

        /// Display name.
        #[arg(long)]
        display_name: Option<String>,
    },
}

/// Role commands.
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// List roles in a realm.
    List,

    /// Create a realm role.
    Create {
        /// Role name.
        name: String,

        /// Role description.
        #[arg(long)]
        description: Option<String>,
    },
}

/// User commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List local users in a realm.
    List {
        /// Search query.
        #[arg(long)]
        search: Option<String>,

        /// Only show accounts materialized from the registry.
        #[arg(long)]
        federated: bool,

        /// Maximum results.
        #[arg(long, default_value = "100")]
        max: usize,
    },
}
