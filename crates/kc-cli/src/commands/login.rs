//! Login command.

use kc_federation::{CredentialInput, CredentialValidator, UserLookupProvider};

use crate::output::{prompt_password, success};

use super::Context;

/// Runs a login command.
///
/// A successful login materializes the account, so the store is saved.
pub async fn run_login(
    ctx: &Context,
    username: &str,
    password: Option<String>,
) -> crate::CliResult<()> {
    let realm = ctx.realm().await?;
    let provider = ctx.factory(&realm)?.create();

    let password = match password {
        Some(p) => p,
        None => prompt_password(&format!("Password for {username}: "))?,
    };

    let rejected = || crate::CliError::Auth("invalid username or password".to_string());
    let user = provider
        .get_user_by_username(realm.id, username)
        .ok_or_else(rejected)?;

    if !provider
        .is_valid(realm.id, &user, &CredentialInput::password(password))
        .await?
    {
        return Err(rejected());
    }

    ctx.save().await?;
    success(&format!("User '{username}' authenticated in realm '{}'", realm.name));
    Ok(())
}
