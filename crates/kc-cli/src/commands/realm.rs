//! Realm management commands.

use kc_model::Realm;
use kc_storage::TransactionManager;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::RealmCommand;
use crate::output::{output, success};

use super::Context;

/// Realm representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RealmDisplay {
    /// Realm ID.
    pub id: String,
    /// Realm name.
    pub name: String,
    /// Display name.
    #[tabled(rename = "Display Name")]
    pub display_name: String,
    /// Whether the realm is enabled.
    pub enabled: bool,
}

impl From<Realm> for RealmDisplay {
    fn from(realm: Realm) -> Self {
        Self {
            id: realm.id.to_string(),
            name: realm.name,
            display_name: realm.display_name.unwrap_or_default(),
            enabled: realm.enabled,
        }
    }
}

/// Runs a realm command.
pub async fn run_realm(cmd: RealmCommand, ctx: &Context) -> crate::CliResult<()> {
    match cmd {
        RealmCommand::List => list_realms(ctx).await,
        RealmCommand::Create { name, display_name } => {
            create_realm(ctx, &name, display_name.as_deref()).await
        }
    }
}

/// Lists all realms.
async fn list_realms(ctx: &Context) -> crate::CliResult<()> {
    let session = ctx.store().begin().await?;
    let realms = session.realms().list().await?;
    session.rollback().await?;

    let realms: Vec<RealmDisplay> = realms.into_iter().map(Into::into).collect();
    output(&realms, ctx.output())
}

/// Creates a new realm.
async fn create_realm(
    ctx: &Context,
    name: &str,
    display_name: Option<&str>,
) -> crate::CliResult<()> {
    let mut realm = Realm::new(name);
    if let Some(dn) = display_name {
        realm = realm.with_display_name(dn);
    }

    let session = ctx.store().begin().await?;
    session.realms().create(&realm).await?;
    session.commit().await?;

    ctx.save().await?;
    success(&format!("Realm '{name}' created successfully"));
    Ok(())
}
