//! Common test utilities and fixtures.

use std::io::Write;
use std::sync::Arc;

use kc_federation::FederationConfig;
use kc_federation_properties::{PropertiesProviderFactory, PROVIDER_ID};
use kc_model::{Realm, Role};
use kc_storage::TransactionManager;
use kc_storage_memory::InMemoryStore;
use tempfile::NamedTempFile;

/// Test environment: a store with one realm and a registry file.
pub struct TestEnv {
    /// Local account store.
    pub store: InMemoryStore,
    /// Realm the provider is attached to.
    pub realm: Realm,
    /// Registry file, kept alive for the test.
    pub users_file: NamedTempFile,
}

impl TestEnv {
    /// Creates a realm with the `montage` role and writes `registry` to a file.
    pub async fn new(registry: &str) -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("kc_federation=debug,kc_federation_properties=debug")
            .with_test_writer()
            .try_init();

        let store = InMemoryStore::new();
        let realm = Realm::new("test");

        let session = store.begin().await?;
        session.realms().create(&realm).await?;
        session
            .roles()
            .create(&Role::new_realm_role(realm.id, "montage"))
            .await?;
        session.commit().await?;

        let mut users_file = NamedTempFile::new()?;
        users_file.write_all(registry.as_bytes())?;
        users_file.flush()?;

        Ok(Self {
            store,
            realm,
            users_file,
        })
    }

    /// Builds a provider configuration, with extra settings applied.
    pub fn config(&self, extra: &[(&str, &str)]) -> anyhow::Result<FederationConfig> {
        let mut builder = FederationConfig::builder()
            .realm_id(self.realm.id)
            .provider_type(PROVIDER_ID)
            .name("properties")
            .config("usersFile", self.users_file.path().display().to_string());
        for (key, value) in extra {
            builder = builder.config(*key, *value);
        }
        Ok(builder.build()?)
    }

    /// Initializes a factory over the registry file.
    pub fn factory(&self, extra: &[(&str, &str)]) -> anyhow::Result<PropertiesProviderFactory> {
        let store: Arc<dyn TransactionManager> = Arc::new(self.store.clone());
        Ok(PropertiesProviderFactory::init(self.config(extra)?, store)?)
    }

    /// Counts local accounts in the realm.
    pub async fn user_count(&self) -> anyhow::Result<u64> {
        let session = self.store.begin().await?;
        let count = session.users().count(self.realm.id).await?;
        session.rollback().await?;
        Ok(count)
    }
}
