//! Role management commands.

use kc_model::Role;
use kc_storage::TransactionManager;
use serde::Serialize;
use tabled::Tabled;

use crate::cli::RoleCommand;
use crate::output::{output, success};

use super::Context;

/// Role representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RoleDisplay {
    /// Role ID.
    pub id: String,
    /// Role name.
    pub name: String,
    /// Description.
    pub description: String,
}

impl From<Role> for RoleDisplay {
    fn from(role: Role) -> Self {
        Self {
            id: role.id.to_string(),
            name: role.name,
            description: role.description.unwrap_or_default(),
        }
    }
}

/// Runs a role command.
pub async fn run_role(cmd: RoleCommand, ctx: &Context) -> crate::CliResult<()> {
    match cmd {
        RoleCommand::List => list_roles(ctx).await,
        RoleCommand::Create { name, description } => {
            create_role(ctx, &name, description.as_deref()).await
        }
    }
}

/// Lists roles in the effective realm.
async fn list_roles(ctx: &Context) -> crate::CliResult<()> {
    let realm = ctx.realm().await?;

    let session = ctx.store().begin().await?;
    let roles = session.roles().list_realm_roles(realm.id).await?;
    session.rollback().await?;

    let roles: Vec<RoleDisplay> = roles.into_iter().map(Into::into).collect();
    output(&roles, ctx.output())
}

/// Creates a realm role.
async fn create_role(ctx: &Context, name: &str, description: Option<&str>) -> crate::CliResult<()> {
    let realm = ctx.realm().await?;

    let mut role = Role::new_realm_role(realm.id, name);
    if let Some(desc) = description {
        role = role.with_description(desc);
    }

    let session = ctx.store().begin().await?;
    session.roles().create(&role).await?;
    session.commit().await?;

    ctx.save().await?;
    success(&format!("Role '{name}' created in realm '{}'", realm.name));
    Ok(())
}
