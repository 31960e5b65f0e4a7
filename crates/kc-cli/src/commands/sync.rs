//! Bulk import commands.

use chrono::{DateTime, Utc};
use kc_federation::{ImportSynchronization, SyncResult};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{output, success, warning};

use super::Context;

/// Sync result for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct SyncDisplay {
    /// Accounts created.
    pub added: usize,
    /// Entries that already had an account.
    pub skipped: usize,
    /// Start time.
    #[tabled(rename = "Started")]
    pub started_at: String,
    /// Completion time.
    #[tabled(rename = "Completed")]
    pub completed_at: String,
}

impl From<&SyncResult> for SyncDisplay {
    fn from(result: &SyncResult) -> Self {
        Self {
            added: result.added,
            skipped: result.skipped,
            started_at: result.started_at.to_rfc3339(),
            completed_at: result.completed_at.to_rfc3339(),
        }
    }
}

/// Runs a full sync, or a changed sync when `since` is given.
pub async fn run_sync(ctx: &Context, since: Option<DateTime<Utc>>) -> crate::CliResult<()> {
    let realm = ctx.realm().await?;
    let factory = ctx.factory(&realm)?;

    let result = match since {
        Some(since) => factory.sync_changed(realm.id, since).await?,
        None => factory.sync_full(realm.id).await?,
    };

    ctx.save().await?;
    if result.total() == 0 {
        warning("Registry is empty, nothing was imported");
    }
    success(&result.status);
    output(&[SyncDisplay::from(&result)], ctx.output())
}
