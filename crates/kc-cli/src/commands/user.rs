//! Local account listing.

use std::collections::HashMap;

use kc_model::User;
use kc_storage::user::UserSearchCriteria;
use kc_storage::TransactionManager;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::cli::UserCommand;
use crate::output::output;

use super::Context;

/// User representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct UserDisplay {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Whether the account is enabled.
    pub enabled: bool,
    /// Provider that materialized the account.
    #[tabled(rename = "Federation Link")]
    pub federation_link: String,
    /// Granted realm roles.
    pub roles: String,
    /// Attributes as `name=value` pairs.
    pub attributes: String,
}

impl UserDisplay {
    fn new(user: User, roles: &[String]) -> Self {
        let mut attributes: Vec<String> = user
            .attributes
            .iter()
            .map(|(name, values)| format!("{name}={}", values.join("|")))
            .collect();
        attributes.sort();

        Self {
            id: user.id.to_string(),
            username: user.username,
            enabled: user.enabled,
            federation_link: user.federation_link.unwrap_or_default(),
            roles: roles.join(", "),
            attributes: attributes.join(", "),
        }
    }
}

/// Runs a user command.
pub async fn run_user(cmd: UserCommand, ctx: &Context) -> crate::CliResult<()> {
    match cmd {
        UserCommand::List {
            search,
            federated,
            max,
        } => list_users(ctx, search, federated, max).await,
    }
}

/// Lists local users, optionally only those materialized by this provider.
async fn list_users(
    ctx: &Context,
    search: Option<String>,
    federated: bool,
    max: usize,
) -> crate::CliResult<()> {
    let realm = ctx.realm().await?;

    let mut criteria = UserSearchCriteria::new().max_results(max);
    if let Some(s) = search {
        criteria = criteria.search(s);
    }
    if federated {
        criteria = criteria.federation_link(ctx.federation_link());
    }

    let session = ctx.store().begin().await?;
    let role_names: HashMap<Uuid, String> = session
        .roles()
        .list_realm_roles(realm.id)
        .await?
        .into_iter()
        .map(|r| (r.id, r.name))
        .collect();

    let users = session.users().search(realm.id, &criteria).await?;
    let mut rows = Vec::with_capacity(users.len());
    for user in users {
        let roles: Vec<String> = session
            .users()
            .get_roles(realm.id, user.id)
            .await?
            .iter()
            .filter_map(|id| role_names.get(id).cloned())
            .collect();
        rows.push(UserDisplay::new(user, &roles));
    }
    session.rollback().await?;

    output(&rows, ctx.output())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_sorts_attributes() {
        let mut user = User::new(Uuid::now_v7(), "alice").with_federation_link("p1");
        user.set_single_attribute("phone", "79031112233");
        user.set_single_attribute("email", "a@example.com");

        let display = UserDisplay::new(user, &["montage".to_string()]);
        assert_eq!(display.attributes, "email=a@example.com, phone=79031112233");
        assert_eq!(display.roles, "montage");
        assert_eq!(display.federation_link, "p1");
    }
}
