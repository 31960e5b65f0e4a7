//! Login-time resolution and just-in-time provisioning.

use std::sync::Arc;

use kc_federation::{CredentialInput, CredentialValidator, StorageId, UserLookupProvider};
use kc_model::User;
use kc_storage::TransactionManager;

use crate::common::TestEnv;

const REGISTRY: &str = "\
# registry
alice=s3cret
bob : hunter2
";

#[tokio::test]
async fn first_login_materializes_account() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let provider = env.factory(&[])?.create();
    let realm_id = env.realm.id;

    let user = provider
        .get_user_by_username(realm_id, "alice")
        .expect("alice is in the registry");
    assert_eq!(env.user_count().await?, 0, "lookup must not write");

    let valid = provider
        .is_valid(realm_id, &user, &CredentialInput::password("s3cret"))
        .await?;
    assert!(valid);

    let session = env.store.begin().await?;
    let account = session
        .users()
        .get_by_username(realm_id, "alice")
        .await?
        .expect("account materialized");
    assert!(account.enabled);
    assert_eq!(account.federation_link.as_deref(), Some(provider.provider_id().as_str()));
    assert_eq!(account.get_first_attribute("phone"), Some("79031112233"));

    let montage = session
        .roles()
        .get_realm_role_by_name(realm_id, "montage")
        .await?
        .expect("role exists");
    assert!(session.users().has_role(realm_id, account.id, montage.id).await?);
    assert!(session
        .credentials()
        .get_password(realm_id, account.id)
        .await?
        .is_some());
    session.rollback().await?;

    Ok(())
}

#[tokio::test]
async fn composite_id_resolves_same_user() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let provider = env.factory(&[])?.create();

    let by_name = provider
        .get_user_by_username(env.realm.id, "bob")
        .expect("bob is in the registry");
    let composite = StorageId::new(provider.provider_id(), "bob").to_string();
    let by_id = provider.get_user_by_id(env.realm.id, &composite)?;

    assert_eq!(by_id, Some(by_name));
    assert!(provider.get_user_by_id(env.realm.id, "no-separator").is_err());
    Ok(())
}

#[tokio::test]
async fn rejected_logins_write_nothing() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let provider = env.factory(&[])?.create();
    let realm_id = env.realm.id;

    let alice = provider
        .get_user_by_username(realm_id, "alice")
        .expect("alice is in the registry");
    assert!(!provider
        .is_valid(realm_id, &alice, &CredentialInput::password("wrong"))
        .await?);
    assert!(!provider
        .is_valid(realm_id, &alice, &CredentialInput::new("otp", "s3cret"))
        .await?);
    assert!(provider.get_user_by_username(realm_id, "mallory").is_none());

    assert_eq!(env.user_count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn repeated_and_concurrent_logins_create_one_account() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let provider = Arc::new(env.factory(&[])?.create());
    let realm_id = env.realm.id;
    let user = provider
        .get_user_by_username(realm_id, "alice")
        .expect("alice is in the registry");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let provider = Arc::clone(&provider);
        let user = user.clone();
        handles.push(tokio::spawn(async move {
            provider
                .is_valid(realm_id, &user, &CredentialInput::password("s3cret"))
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await??);
    }

    assert!(provider
        .is_valid(realm_id, &user, &CredentialInput::password("s3cret"))
        .await?);
    assert_eq!(env.user_count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn registry_secret_does_not_unlock_local_account() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let realm_id = env.realm.id;

    let session = env.store.begin().await?;
    let local = User::new(realm_id, "alice").with_enabled(true);
    session.users().create(&local).await?;
    session.commit().await?;
    let before = env.store.snapshot().await;

    let provider = env.factory(&[])?.create();
    let alice = provider
        .get_user_by_username(realm_id, "alice")
        .expect("alice is in the registry");
    assert!(!provider
        .is_valid(realm_id, &alice, &CredentialInput::password("s3cret"))
        .await?);

    assert_eq!(env.store.snapshot().await, before);
    Ok(())
}

#[tokio::test]
async fn configured_role_and_attributes_apply() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let provider = env
        .factory(&[("defaultRole", ""), ("attribute.department", "field")])?
        .create();
    let realm_id = env.realm.id;
    let user = provider
        .get_user_by_username(realm_id, "bob")
        .expect("bob is in the registry");

    assert!(provider
        .is_valid(realm_id, &user, &CredentialInput::password("hunter2"))
        .await?);

    let session = env.store.begin().await?;
    let account = session
        .users()
        .get_by_username(realm_id, "bob")
        .await?
        .expect("account materialized");
    assert_eq!(account.get_first_attribute("department"), Some("field"));
    assert_eq!(account.get_first_attribute("phone"), None);
    assert!(session.users().get_roles(realm_id, account.id).await?.is_empty());
    session.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn missing_registry_file_resolves_nobody() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("absent.properties").display().to_string();

    let provider = env.factory(&[("usersFile", missing.as_str())])?.create();
    assert!(provider.get_user_by_username(env.realm.id, "alice").is_none());
    Ok(())
}
