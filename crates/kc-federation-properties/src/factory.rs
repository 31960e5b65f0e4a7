//! Properties provider factory and bulk import.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kc_federation::lock::KeyedLocks;
use kc_federation::provisioning::{self, Provisioned, ProvisioningRequest};
use kc_federation::{
    ExternalRegistry, FederationConfig, FederationError, FederationResult, ImportSynchronization,
    SyncResult,
};
use kc_storage::{StorageSession, TransactionManager};
use uuid::Uuid;

use crate::config::PropertiesProviderConfig;
use crate::loader;
use crate::provider::PropertiesStorageProvider;

/// Provider type identifier.
pub const PROVIDER_ID: &str = "saas";

/// Creates properties providers and runs bulk imports.
///
/// The registry is loaded once, when the factory is initialized, and
/// shared by every provider the factory creates.
pub struct PropertiesProviderFactory {
    config: FederationConfig,
    settings: PropertiesProviderConfig,
    registry: Arc<dyn ExternalRegistry>,
    store: Arc<dyn TransactionManager>,
    locks: KeyedLocks,
}

impl PropertiesProviderFactory {
    /// Initializes a factory, loading the configured registry file.
    ///
    /// A missing or unreadable file is logged and yields an empty registry.
    ///
    /// ## Errors
    ///
    /// Returns `FederationError::Configuration` if the provider settings are
    /// invalid.
    pub fn init(
        config: FederationConfig,
        store: Arc<dyn TransactionManager>,
    ) -> FederationResult<Self> {
        let settings = PropertiesProviderConfig::from_federation_config(&config)?;

        let registry = match &settings.users_file {
            Some(path) => loader::load_or_empty(path),
            None => {
                tracing::warn!(provider = %config.name, "No usersFile configured, registry is empty");
                Default::default()
            }
        };

        Self::with_registry(config, settings, Arc::new(registry), store)
    }

    /// Creates a factory over an already loaded registry.
    ///
    /// ## Errors
    ///
    /// Returns `FederationError::Configuration` if `config` is not a
    /// properties provider configuration.
    pub fn with_registry(
        config: FederationConfig,
        settings: PropertiesProviderConfig,
        registry: Arc<dyn ExternalRegistry>,
        store: Arc<dyn TransactionManager>,
    ) -> FederationResult<Self> {
        if config.provider_type != PROVIDER_ID {
            return Err(FederationError::config(format!(
                "expected provider type '{PROVIDER_ID}', got '{}'",
                config.provider_type
            )));
        }

        tracing::info!(
            provider = %config.name,
            entries = registry.len(),
            "Initialized properties federation provider"
        );

        Ok(Self {
            config,
            settings,
            registry,
            store,
            locks: KeyedLocks::new(),
        })
    }

    /// Returns the provider type identifier.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    /// Returns the provider configuration.
    #[must_use]
    pub const fn config(&self) -> &FederationConfig {
        &self.config
    }

    /// Returns the provider settings.
    #[must_use]
    pub const fn settings(&self) -> &PropertiesProviderConfig {
        &self.settings
    }

    /// Returns the shared registry.
    #[must_use]
    pub fn registry(&self) -> &dyn ExternalRegistry {
        self.registry.as_ref()
    }

    /// Creates a provider sharing this factory's registry, store, and locks.
    #[must_use]
    pub fn create(&self) -> PropertiesStorageProvider {
        PropertiesStorageProvider::new(
            self.config.clone(),
            Arc::clone(&self.registry),
            Arc::clone(&self.store),
            self.settings.policy.clone(),
            self.locks.clone(),
        )
    }

    /// Materializes every registry entry inside `session`.
    async fn import_all(
        &self,
        session: &dyn StorageSession,
        realm_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> FederationResult<SyncResult> {
        if session.realms().get_by_id(realm_id).await?.is_none() {
            return Err(FederationError::RealmNotFound(realm_id));
        }

        let policy = &self.settings.policy;
        let role =
            provisioning::resolve_default_role(session, realm_id, policy.default_role.as_deref())
                .await?;
        let federation_link = self.config.id.to_string();

        let mut result = SyncResult::new(started_at);
        for record in self.registry.records() {
            let mut request = ProvisioningRequest::new(&record.external_id, &federation_link)
                .with_role(role.clone())
                .with_attributes(policy.attributes.clone());
            if policy.sync_credentials {
                request = request.with_password(record.secret);
            }

            match provisioning::materialize(session, realm_id, &request).await? {
                Provisioned::Created(_) => result.record_added(),
                Provisioned::Existing(_) | Provisioned::Unlinked(_) => result.record_skipped(),
            }
            tracing::debug!(external_id = %record.external_id, "Synced user");
        }

        Ok(result)
    }
}

impl ImportSynchronization for PropertiesProviderFactory {
    async fn sync_full(&self, realm_id: Uuid) -> FederationResult<SyncResult> {
        let started_at = Utc::now();
        tracing::info!(
            realm_id = %realm_id,
            entries = self.registry.len(),
            "Starting full sync"
        );

        let session = self.store.begin().await?;
        match self.import_all(session.as_ref(), realm_id, started_at).await {
            Ok(result) => {
                session
                    .commit()
                    .await
                    .map_err(|e| FederationError::sync(format!("commit failed: {e}")))?;
                let result = result.complete();
                tracing::info!(
                    realm_id = %realm_id,
                    added = result.added,
                    skipped = result.skipped,
                    "Full sync committed"
                );
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback) = session.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback after failed sync failed");
                }
                tracing::error!(realm_id = %realm_id, error = %e, "Full sync failed, rolled back");
                match e {
                    FederationError::RealmNotFound(_) => Err(e),
                    other => Err(FederationError::sync(other.to_string())),
                }
            }
        }
    }

    async fn sync_changed(
        &self,
        realm_id: Uuid,
        since: DateTime<Utc>,
    ) -> FederationResult<SyncResult> {
        tracing::debug!(
            realm_id = %realm_id,
            since = %since,
            "Registry has no change tracking, running full sync"
        );
        self.sync_full(realm_id).await
    }
}
