//! Registry lookup command.

use kc_federation::{UserLookupProvider, VirtualUser};
use kc_storage::TransactionManager;
use serde::Serialize;

use crate::output::output_single;

use super::Context;

/// Lookup result for display.
#[derive(Debug, Clone, Serialize)]
pub struct LookupDisplay {
    /// External id.
    pub external_id: String,
    /// Composite storage id.
    pub storage_id: String,
    /// Local account id, if the user has been materialized.
    pub local_user_id: Option<String>,
}

/// Runs a lookup command.
pub async fn run_lookup(ctx: &Context, id: &str, composite: bool) -> crate::CliResult<()> {
    let realm = ctx.realm().await?;
    let provider = ctx.factory(&realm)?.create();

    let user = if composite {
        provider.get_user_by_id(realm.id, id)?
    } else {
        provider.get_user_by_username(realm.id, id)
    };
    let user: VirtualUser = user.ok_or_else(|| crate::CliError::not_found("user", id))?;

    let session = ctx.store().begin().await?;
    let local = session
        .users()
        .get_by_username(realm.id, user.username())
        .await?;
    session.rollback().await?;

    let display = LookupDisplay {
        external_id: user.external_id.clone(),
        storage_id: user.storage_id().to_string(),
        local_user_id: local.map(|u| u.id.to_string()),
    };
    output_single(&display, ctx.output())
}
