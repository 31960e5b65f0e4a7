//! Bulk import of the whole registry.

use chrono::Utc;
use kc_federation::{
    CredentialInput, CredentialValidator, FederationError, ImportSynchronization,
    UserLookupProvider,
};
use kc_model::User;
use kc_storage::TransactionManager;

use crate::common::TestEnv;

const REGISTRY: &str = "alice=pw1\nbob=pw2\ncarol=pw3\n";

#[tokio::test]
async fn full_sync_imports_every_entry() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let factory = env.factory(&[])?;

    let result = factory.sync_full(env.realm.id).await?;
    assert_eq!(result.added, 3);
    assert_eq!(result.skipped, 0);
    assert_eq!(env.user_count().await?, 3);

    let session = env.store.begin().await?;
    let carol = session
        .users()
        .get_by_username(env.realm.id, "carol")
        .await?
        .expect("carol imported");
    assert!(carol.enabled);
    assert_eq!(carol.get_first_attribute("phone"), Some("79031112233"));
    assert!(session
        .credentials()
        .get_password(env.realm.id, carol.id)
        .await?
        .is_none());
    session.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn sync_after_login_skips_existing_account() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let factory = env.factory(&[])?;
    let provider = factory.create();

    let bob = provider
        .get_user_by_username(env.realm.id, "bob")
        .expect("bob is in the registry");
    assert!(provider
        .is_valid(env.realm.id, &bob, &CredentialInput::password("pw2"))
        .await?);

    let result = factory.sync_full(env.realm.id).await?;
    assert_eq!((result.added, result.skipped), (2, 1));
    assert_eq!(env.user_count().await?, 3);

    let again = factory.sync_changed(env.realm.id, Utc::now()).await?;
    assert_eq!((again.added, again.skipped), (0, 3));
    Ok(())
}

#[tokio::test]
async fn login_after_sync_registers_password() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let factory = env.factory(&[])?;
    let provider = factory.create();

    factory.sync_full(env.realm.id).await?;

    let alice = provider
        .get_user_by_username(env.realm.id, "alice")
        .expect("alice is in the registry");
    assert!(provider
        .is_valid(env.realm.id, &alice, &CredentialInput::password("pw1"))
        .await?);

    let session = env.store.begin().await?;
    let account = session
        .users()
        .get_by_username(env.realm.id, "alice")
        .await?
        .expect("alice imported");
    let credentials = session
        .credentials()
        .list_by_user(env.realm.id, account.id)
        .await?;
    session.rollback().await?;

    assert_eq!(credentials.len(), 1);
    assert_eq!(credentials[0].secret_data, "pw1");
    assert_eq!(env.user_count().await?, 3);
    Ok(())
}

#[tokio::test]
async fn sync_skips_accounts_owned_elsewhere() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let session = env.store.begin().await?;
    session
        .users()
        .create(&User::new(env.realm.id, "bob").with_enabled(true))
        .await?;
    session.commit().await?;

    let result = env.factory(&[])?.sync_full(env.realm.id).await?;
    assert_eq!((result.added, result.skipped), (2, 1));

    let session = env.store.begin().await?;
    let bob = session
        .users()
        .get_by_username(env.realm.id, "bob")
        .await?
        .expect("local bob kept");
    session.rollback().await?;
    assert_eq!(bob.federation_link, None);
    assert_eq!(bob.get_first_attribute("phone"), None);
    Ok(())
}

#[tokio::test]
async fn imported_accounts_can_log_in_with_synced_credentials() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let factory = env.factory(&[("syncCredentials", "true")])?;

    factory.sync_full(env.realm.id).await?;

    let session = env.store.begin().await?;
    let alice = session
        .users()
        .get_by_username(env.realm.id, "alice")
        .await?
        .expect("alice imported");
    assert!(session
        .credentials()
        .get_password(env.realm.id, alice.id)
        .await?
        .is_some());
    session.rollback().await?;
    Ok(())
}

#[tokio::test]
async fn one_bad_entry_rolls_back_whole_sync() -> anyhow::Result<()> {
    let long_name = "x".repeat(300);
    let env = TestEnv::new(&format!("{REGISTRY}{long_name}=pw\n")).await?;
    let factory = env.factory(&[])?;

    let before = env.store.snapshot().await;
    let err = factory.sync_full(env.realm.id).await.unwrap_err();
    assert!(matches!(err, FederationError::Sync(_)), "got {err:?}");

    assert_eq!(env.store.snapshot().await, before);
    assert_eq!(env.user_count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn sync_into_unknown_realm_fails() -> anyhow::Result<()> {
    let env = TestEnv::new(REGISTRY).await?;
    let factory = env.factory(&[])?;

    let err = factory.sync_full(uuid::Uuid::now_v7()).await.unwrap_err();
    assert!(matches!(err, FederationError::RealmNotFound(_)));
    assert_eq!(env.user_count().await?, 0);
    Ok(())
}
