//! # Keycloak federation CLI
//!
//! Resolves, logs in, and imports users from a properties registry.

#![forbid(unsafe_code)]

use anyhow::Context as _;
use clap::Parser;
use kc_cli::{
    cli::{Cli, Command},
    commands::{run_login, run_lookup, run_realm, run_role, run_sync, run_user, Context},
    config::CliConfig,
    output::error,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => CliConfig::default_path().context("failed to resolve config path")?,
    };
    let mut config = CliConfig::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let provider_id = config
        .ensure_provider_id(&config_path)
        .context("failed to persist provider id")?;

    if let Some(users_file) = cli.users_file {
        config.users_file = Some(users_file);
    }
    if let Some(store) = cli.store {
        config.store_file = store;
    }

    let output = cli.output.unwrap_or(config.output_format);
    let ctx = Context::open(config, provider_id, cli.realm, output)
        .await
        .context("failed to open local store")?;

    let result = match cli.command {
        Command::Lookup { id, composite } => run_lookup(&ctx, &id, composite).await,
        Command::Login { username, password } => run_login(&ctx, &username, password).await,
        Command::Sync => run_sync(&ctx, None).await,
        Command::SyncSince { since } => run_sync(&ctx, Some(since)).await,
        Command::Realm(cmd) => run_realm(cmd, &ctx).await,
        Command::Role(cmd) => run_role(cmd, &ctx).await,
        Command::User(cmd) => run_user(cmd, &ctx).await,
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
