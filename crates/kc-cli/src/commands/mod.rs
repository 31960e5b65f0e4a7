//! Command implementations.

pub mod login;
pub mod lookup;
pub mod realm;
pub mod role;
pub mod sync;
pub mod user;

pub use login::run_login;
pub use lookup::run_lookup;
pub use realm::run_realm;
pub use role::run_role;
pub use sync::run_sync;
pub use user::run_user;

use std::path::PathBuf;
use std::sync::Arc;

use kc_federation::FederationConfig;
use kc_federation_properties::config::{
    ATTRIBUTE_PREFIX, DEFAULT_ROLE_KEY, SYNC_CREDENTIALS_KEY, USERS_FILE_KEY,
};
use kc_federation_properties::{PropertiesProviderFactory, PROVIDER_ID};
use kc_model::Realm;
use kc_storage::TransactionManager;
use kc_storage_memory::InMemoryStore;
use uuid::Uuid;

use crate::config::OutputFormat;
use crate::CliConfig;

/// Everything a command needs: the effective settings and the local store.
pub struct Context {
    config: CliConfig,
    provider_id: Uuid,
    store: InMemoryStore,
    store_path: PathBuf,
    realm: Option<String>,
    output: OutputFormat,
}

impl Context {
    /// Opens the local store snapshot named by the configuration.
    pub async fn open(
        config: CliConfig,
        provider_id: Uuid,
        realm: Option<String>,
        output: OutputFormat,
    ) -> crate::CliResult<Self> {
        let store_path = config.store_file.clone();
        let store = InMemoryStore::load(&store_path).await?;

        Ok(Self {
            config,
            provider_id,
            store,
            store_path,
            realm,
            output,
        })
    }

    /// Returns the output format.
    pub const fn output(&self) -> OutputFormat {
        self.output
    }

    /// Returns the federation link recorded on materialized accounts.
    pub fn federation_link(&self) -> String {
        self.provider_id.to_string()
    }

    /// Returns the local store.
    pub const fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Writes the local store back to its snapshot file.
    pub async fn save(&self) -> crate::CliResult<()> {
        self.store.save(&self.store_path).await?;
        tracing::debug!(path = %self.store_path.display(), "Saved store snapshot");
        Ok(())
    }

    /// Resolves the effective realm by name.
    pub async fn realm(&self) -> crate::CliResult<Realm> {
        let name = self.config.effective_realm(self.realm.as_deref()).ok_or_else(|| {
            crate::CliError::InvalidArgument("realm is required".to_string())
        })?;

        let session = self.store.begin().await?;
        let realm = session.realms().get_by_name(&name).await?;
        session.rollback().await?;

        realm.ok_or_else(|| crate::CliError::not_found("realm", name))
    }

    /// Builds the provider configuration for a realm.
    pub fn federation_config(&self, realm: &Realm) -> crate::CliResult<FederationConfig> {
        let policy = &self.config.provisioning;

        let mut builder = FederationConfig::builder()
            .id(self.provider_id)
            .realm_id(realm.id)
            .provider_type(PROVIDER_ID)
            .name(&self.config.provider_name)
            .config(DEFAULT_ROLE_KEY, policy.default_role.clone().unwrap_or_default())
            .config(SYNC_CREDENTIALS_KEY, policy.sync_credentials.to_string());

        if let Some(path) = &self.config.users_file {
            builder = builder.config(USERS_FILE_KEY, path.display().to_string());
        }
        for (name, value) in &policy.attributes {
            builder = builder.config(format!("{ATTRIBUTE_PREFIX}{name}"), value);
        }

        Ok(builder.build()?)
    }

    /// Initializes the provider factory for a realm.
    pub fn factory(&self, realm: &Realm) -> crate::CliResult<PropertiesProviderFactory> {
        let store: Arc<dyn TransactionManager> = Arc::new(self.store.clone());
        Ok(PropertiesProviderFactory::init(
            self.federation_config(realm)?,
            store,
        )?)
    }
}
