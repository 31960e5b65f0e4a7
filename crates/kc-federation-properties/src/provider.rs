//! Properties storage provider implementation.
//!
//! ## Security Requirements
//!
//! - Secrets are compared in constant time
//! - Secrets are never logged
//! - The registry is never written

use std::sync::Arc;

use kc_federation::lock::KeyedLocks;
use kc_federation::provisioning::{self, Provisioned, ProvisioningPolicy, ProvisioningRequest};
use kc_federation::{
    CredentialInput, CredentialValidator, ExternalRegistry, FederationConfig, FederationError,
    FederationResult, UserLookupProvider, VirtualUser,
};
use kc_model::CredentialType;
use kc_storage::{StorageSession, TransactionManager};
use uuid::Uuid;

use crate::factory::PROVIDER_ID;

/// Properties storage provider.
///
/// Resolves users against the shared registry and materializes them into
/// the local store on their first successful login.
pub struct PropertiesStorageProvider {
    /// Federation configuration.
    config: FederationConfig,

    /// Shared, immutable registry.
    registry: Arc<dyn ExternalRegistry>,

    /// Local store.
    store: Arc<dyn TransactionManager>,

    /// What materialized accounts receive.
    policy: ProvisioningPolicy,

    /// Per-user materialization locks, shared with sibling providers.
    locks: KeyedLocks,
}

impl PropertiesStorageProvider {
    /// Creates a provider over a registry and store.
    #[must_use]
    pub fn new(
        config: FederationConfig,
        registry: Arc<dyn ExternalRegistry>,
        store: Arc<dyn TransactionManager>,
        policy: ProvisioningPolicy,
        locks: KeyedLocks,
    ) -> Self {
        Self {
            config,
            registry,
            store,
            policy,
            locks,
        }
    }

    /// Returns the id recorded as the federation link of materialized accounts.
    #[must_use]
    pub fn provider_id(&self) -> String {
        self.config.id.to_string()
    }

    /// Rejects account registration; the registry is read-only.
    ///
    /// ## Errors
    ///
    /// Always returns `FederationError::ReadOnly`.
    pub fn add_user(&self, _realm_id: Uuid, _username: &str) -> FederationResult<VirtualUser> {
        Err(FederationError::read_only("add user"))
    }

    /// Rejects account removal; the registry is read-only.
    ///
    /// ## Errors
    ///
    /// Always returns `FederationError::ReadOnly`.
    pub fn remove_user(&self, _realm_id: Uuid, _user: &VirtualUser) -> FederationResult<()> {
        Err(FederationError::read_only("remove user"))
    }

    /// Materializes an account for a user whose secret was just verified.
    ///
    /// Runs in its own session under the user's lock. On failure the
    /// session is rolled back and nothing is kept.
    async fn provision_on_login(
        &self,
        realm_id: Uuid,
        external_id: &str,
        secret: &str,
    ) -> FederationResult<Provisioned> {
        let _guard = self.locks.lock(external_id).await;
        let session = self.store.begin().await?;

        match self
            .materialize_in(session.as_ref(), realm_id, external_id, secret)
            .await
        {
            Ok(outcome) => {
                session.commit().await?;
                if outcome.is_created() {
                    tracing::info!(
                        realm_id = %realm_id,
                        external_id = %external_id,
                        user_id = %outcome.user().id,
                        "Materialized federated user on login"
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback) = session.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback after failed provisioning failed");
                }
                tracing::error!(
                    realm_id = %realm_id,
                    external_id = %external_id,
                    error = %e,
                    "Provisioning on login failed, rolled back"
                );
                Err(e)
            }
        }
    }

    async fn materialize_in(
        &self,
        session: &dyn StorageSession,
        realm_id: Uuid,
        external_id: &str,
        secret: &str,
    ) -> FederationResult<Provisioned> {
        let role = provisioning::resolve_default_role(
            session,
            realm_id,
            self.policy.default_role.as_deref(),
        )
        .await
        .map_err(|e| match e {
            FederationError::Storage(source) => FederationError::provisioning(external_id, source),
            other => other,
        })?;

        let request = ProvisioningRequest::new(external_id, self.provider_id())
            .with_role(role)
            .with_attributes(self.policy.attributes.clone())
            .with_password(secret);

        provisioning::materialize(session, realm_id, &request).await
    }
}

impl UserLookupProvider for PropertiesStorageProvider {
    fn config(&self) -> &FederationConfig {
        &self.config
    }

    fn provider_type(&self) -> &'static str {
        PROVIDER_ID
    }

    fn get_user_by_username(&self, realm_id: Uuid, username: &str) -> Option<VirtualUser> {
        let found = self.registry.contains(username);
        tracing::debug!(realm_id = %realm_id, username, found, "Registry lookup");
        found.then(|| VirtualUser::new(self.provider_id(), realm_id, username))
    }
}

impl CredentialValidator for PropertiesStorageProvider {
    fn supports_credential_type(&self, credential_type: &str) -> bool {
        CredentialType::parse(credential_type) == Some(CredentialType::Password)
    }

    fn is_configured_for(&self, user: &VirtualUser, credential_type: &str) -> bool {
        self.supports_credential_type(credential_type) && self.registry.contains(&user.external_id)
    }

    /// Validates a password against the registry.
    ///
    /// A match materializes the local account (once) with the default role,
    /// the attribute template, and the submitted password.
    /// A same-named local account that this provider does not own is never
    /// claimed; the login is rejected.
    async fn is_valid(
        &self,
        realm_id: Uuid,
        user: &VirtualUser,
        input: &CredentialInput,
    ) -> FederationResult<bool> {
        if !self.supports_credential_type(&input.credential_type) {
            return Ok(false);
        }

        let Some(expected) = self.registry.secret(&user.external_id) else {
            tracing::debug!(external_id = %user.external_id, "No registry secret for user");
            return Ok(false);
        };

        if expected.is_empty() {
            tracing::debug!(external_id = %user.external_id, "Registry entry has an empty secret");
            return Ok(false);
        }

        if !constant_time_eq(expected.as_bytes(), input.value.as_bytes()) {
            tracing::debug!(external_id = %user.external_id, "Registry secret mismatch");
            return Ok(false);
        }

        let outcome = self
            .provision_on_login(realm_id, &user.external_id, &input.value)
            .await?;
        Ok(outcome.is_linked())
    }
}

/// Constant-time comparison of two byte slices.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use kc_model::{Realm, Role};
    use kc_storage_memory::InMemoryStore;

    use super::*;
    use crate::registry::PropertiesRegistry;

    /// Registry wrapper that counts secret reads.
    struct CountingRegistry {
        inner: PropertiesRegistry,
        reads: AtomicUsize,
    }

    impl ExternalRegistry for CountingRegistry {
        fn secret(&self, external_id: &str) -> Option<&str> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.secret(external_id)
        }

        fn external_ids(&self) -> Vec<String> {
            self.inner.external_ids()
        }

        fn len(&self) -> usize {
            self.inner.len()
        }
    }

    struct Fixture {
        store: InMemoryStore,
        realm: Realm,
        role: Role,
        provider: PropertiesStorageProvider,
    }

    async fn fixture_with(registry: Arc<dyn ExternalRegistry>) -> Fixture {
        let store = InMemoryStore::new();
        let realm = Realm::new("test");
        let role = Role::new_realm_role(realm.id, "montage");

        let session = store.begin().await.unwrap();
        session.realms().create(&realm).await.unwrap();
        session.roles().create(&role).await.unwrap();
        session.commit().await.unwrap();

        let config = FederationConfig::builder()
            .realm_id(realm.id)
            .provider_type(PROVIDER_ID)
            .build()
            .unwrap();
        let provider = PropertiesStorageProvider::new(
            config,
            registry,
            Arc::new(store.clone()),
            ProvisioningPolicy::default(),
            KeyedLocks::new(),
        );

        Fixture {
            store,
            realm,
            role,
            provider,
        }
    }

    async fn fixture() -> Fixture {
        let registry: PropertiesRegistry = [("alice", "pw1"), ("bob", "pw2")].into_iter().collect();
        fixture_with(Arc::new(registry)).await
    }

    #[test]
    fn constant_time_comparison() {
        assert!(constant_time_eq(b"pw1", b"pw1"));
        assert!(!constant_time_eq(b"pw1", b"pw2"));
        assert!(!constant_time_eq(b"pw1", b"pw10"));
    }

    #[tokio::test]
    async fn resolves_registry_users_only() {
        let f = fixture().await;

        let alice = f.provider.get_user_by_username(f.realm.id, "alice").unwrap();
        assert_eq!(alice.username(), "alice");
        assert_eq!(alice.provider_id, f.provider.provider_id());
        assert!(f.provider.get_user_by_username(f.realm.id, "carol").is_none());
        assert!(f.provider.get_user_by_email(f.realm.id, "alice").is_none());

        // Lookups never materialize anything.
        assert!(f.store.snapshot().await.users.is_empty());
    }

    #[tokio::test]
    async fn resolves_composite_ids() {
        let f = fixture().await;

        let alice = f
            .provider
            .get_user_by_id(f.realm.id, "provider.alice")
            .unwrap()
            .unwrap();
        assert_eq!(alice.external_id, "alice");

        let own_id = alice.storage_id().to_string();
        assert!(f.provider.get_user_by_id(f.realm.id, &own_id).unwrap().is_some());

        let err = f.provider.get_user_by_id(f.realm.id, "garbage").unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[tokio::test]
    async fn credential_type_support() {
        let f = fixture().await;
        let alice = f.provider.get_user_by_username(f.realm.id, "alice").unwrap();
        let stranger = VirtualUser::new(f.provider.provider_id(), f.realm.id, "carol");

        assert!(f.provider.supports_credential_type("password"));
        assert!(!f.provider.supports_credential_type("otp"));
        assert!(f.provider.is_configured_for(&alice, "password"));
        assert!(!f.provider.is_configured_for(&alice, "otp"));
        assert!(!f.provider.is_configured_for(&stranger, "password"));
    }

    #[tokio::test]
    async fn valid_password_materializes_account() {
        let f = fixture().await;
        let alice = f.provider.get_user_by_username(f.realm.id, "alice").unwrap();

        let valid = f
            .provider
            .is_valid(f.realm.id, &alice, &CredentialInput::password("pw1"))
            .await
            .unwrap();
        assert!(valid);

        let session = f.store.begin().await.unwrap();
        let user = session
            .users()
            .get_by_username(f.realm.id, "alice")
            .await
            .unwrap()
            .unwrap();
        assert!(user.enabled);
        assert_eq!(user.get_first_attribute("phone"), Some("79031112233"));
        assert_eq!(user.federation_link, Some(f.provider.provider_id()));
        assert!(session
            .users()
            .has_role(f.realm.id, user.id, f.role.id)
            .await
            .unwrap());

        let credentials = session
            .credentials()
            .list_by_user(f.realm.id, user.id)
            .await
            .unwrap();
        assert_eq!(credentials.len(), 1);
        assert!(credentials[0].is_password());
        assert_eq!(credentials[0].secret_data, "pw1");
    }

    #[tokio::test]
    async fn wrong_password_writes_nothing() {
        let f = fixture().await;
        let alice = f.provider.get_user_by_username(f.realm.id, "alice").unwrap();
        let before = f.store.snapshot().await;

        let valid = f
            .provider
            .is_valid(f.realm.id, &alice, &CredentialInput::password("wrong"))
            .await
            .unwrap();

        assert!(!valid);
        assert_eq!(f.store.snapshot().await, before);
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let f = fixture().await;
        let stranger = VirtualUser::new(f.provider.provider_id(), f.realm.id, "carol");

        let valid = f
            .provider
            .is_valid(f.realm.id, &stranger, &CredentialInput::password("pw1"))
            .await
            .unwrap();

        assert!(!valid);
        assert!(f.store.snapshot().await.users.is_empty());
    }

    #[tokio::test]
    async fn unsupported_type_skips_registry() {
        let registry = Arc::new(CountingRegistry {
            inner: [("alice", "pw1")].into_iter().collect(),
            reads: AtomicUsize::new(0),
        });
        let f = fixture_with(registry.clone()).await;
        let alice = VirtualUser::new(f.provider.provider_id(), f.realm.id, "alice");

        let valid = f
            .provider
            .is_valid(f.realm.id, &alice, &CredentialInput::new("otp", "pw1"))
            .await
            .unwrap();

        assert!(!valid);
        assert_eq!(registry.reads.load(Ordering::SeqCst), 0);
        assert!(f.store.snapshot().await.users.is_empty());
    }

    #[tokio::test]
    async fn repeated_login_does_not_duplicate() {
        let f = fixture().await;
        let alice = f.provider.get_user_by_username(f.realm.id, "alice").unwrap();
        let input = CredentialInput::password("pw1");

        assert!(f.provider.is_valid(f.realm.id, &alice, &input).await.unwrap());
        assert!(f.provider.is_valid(f.realm.id, &alice, &input).await.unwrap());

        let state = f.store.snapshot().await;
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.credentials.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_logins_create_one_account() {
        let f = fixture().await;
        let provider = Arc::new(f.provider);
        let alice = provider.get_user_by_username(f.realm.id, "alice").unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let provider = Arc::clone(&provider);
            let alice = alice.clone();
            let realm_id = f.realm.id;
            handles.push(tokio::spawn(async move {
                provider
                    .is_valid(realm_id, &alice, &CredentialInput::password("pw1"))
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().unwrap());
        }

        let state = f.store.snapshot().await;
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.credentials.len(), 1);
    }

    #[tokio::test]
    async fn provisioning_failure_is_reported_and_rolled_back() {
        let f = fixture().await;
        let alice = f.provider.get_user_by_username(f.realm.id, "alice").unwrap();
        let missing_realm = Uuid::now_v7();

        let err = f
            .provider
            .is_valid(missing_realm, &alice, &CredentialInput::password("pw1"))
            .await
            .unwrap_err();

        assert!(err.is_provisioning_error());
        assert!(f.store.snapshot().await.users.is_empty());
    }

    #[tokio::test]
    async fn role_lookup_failure_is_a_provisioning_error() {
        let f = fixture().await;
        let session = f.store.begin().await.unwrap();
        session.commit().await.unwrap();

        let err = f
            .provider
            .materialize_in(session.as_ref(), f.realm.id, "alice", "pw1")
            .await
            .unwrap_err();

        assert!(err.is_provisioning_error(), "got {err:?}");
    }

    #[tokio::test]
    async fn login_after_import_registers_password() {
        let f = fixture().await;
        let session = f.store.begin().await.unwrap();
        let request = ProvisioningRequest::new("alice", f.provider.provider_id());
        provisioning::materialize(session.as_ref(), f.realm.id, &request)
            .await
            .unwrap();
        session.commit().await.unwrap();
        assert!(f.store.snapshot().await.credentials.is_empty());

        let alice = f.provider.get_user_by_username(f.realm.id, "alice").unwrap();
        assert!(f
            .provider
            .is_valid(f.realm.id, &alice, &CredentialInput::password("pw1"))
            .await
            .unwrap());

        let state = f.store.snapshot().await;
        assert_eq!(state.users.len(), 1);
        assert_eq!(state.credentials.len(), 1);
        assert_eq!(state.credentials[0].secret_data, "pw1");
    }

    #[tokio::test]
    async fn local_account_of_same_name_is_not_claimed() {
        let f = fixture().await;
        let session = f.store.begin().await.unwrap();
        let local = kc_model::User::new(f.realm.id, "alice").with_enabled(true);
        session.users().create(&local).await.unwrap();
        session.commit().await.unwrap();
        let before = f.store.snapshot().await;

        let alice = f.provider.get_user_by_username(f.realm.id, "alice").unwrap();
        let valid = f
            .provider
            .is_valid(f.realm.id, &alice, &CredentialInput::password("pw1"))
            .await
            .unwrap();

        assert!(!valid);
        assert_eq!(f.store.snapshot().await, before);
    }

    #[tokio::test]
    async fn empty_secret_never_validates() {
        let registry: PropertiesRegistry = [("alice", "")].into_iter().collect();
        let f = fixture_with(Arc::new(registry)).await;
        let alice = f.provider.get_user_by_username(f.realm.id, "alice").unwrap();

        let valid = f
            .provider
            .is_valid(f.realm.id, &alice, &CredentialInput::password(""))
            .await
            .unwrap();

        assert!(!valid);
        assert!(f.store.snapshot().await.users.is_empty());
    }

    #[tokio::test]
    async fn registry_is_read_only() {
        let f = fixture().await;
        let alice = f.provider.get_user_by_username(f.realm.id, "alice").unwrap();

        assert!(matches!(
            f.provider.add_user(f.realm.id, "carol"),
            Err(FederationError::ReadOnly(_))
        ));
        assert!(matches!(
            f.provider.remove_user(f.realm.id, &alice),
            Err(FederationError::ReadOnly(_))
        ));
    }
}
