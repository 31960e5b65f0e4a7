//! Federation provider configuration.
//!
//! Configuration types for user federation providers. Provider-specific
//! settings live in a free-form string map, the way a component model is
//! stored, and are interpreted by each provider.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FederationError, FederationResult};

/// Base configuration for all federation providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Unique identifier for this provider configuration.
    pub id: Uuid,

    /// Realm this provider belongs to.
    pub realm_id: Uuid,

    /// Provider type (e.g., "saas", "ldap").
    pub provider_type: String,

    /// Display name.
    pub name: String,

    /// Priority for user lookup (lower = higher priority).
    pub priority: i32,

    /// Whether the provider is enabled.
    pub enabled: bool,

    /// Provider-specific configuration.
    #[serde(default)]
    pub config: HashMap<String, String>,
}

impl FederationConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> FederationConfigBuilder {
        FederationConfigBuilder::new()
    }

    /// Gets a config value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Collects every entry whose key starts with `prefix`, keyed by the
    /// remainder of the key.
    #[must_use]
    pub fn with_prefix(&self, prefix: &str) -> BTreeMap<String, String> {
        self.config
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(prefix)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_string(), v.clone()))
            })
            .collect()
    }
}

/// Builder for FederationConfig.
#[derive(Debug, Default)]
pub struct FederationConfigBuilder {
    id: Option<Uuid>,
    realm_id: Option<Uuid>,
    provider_type: Option<String>,
    name: Option<String>,
    priority: i32,
    enabled: bool,
    config: HashMap<String, String>,
}

impl FederationConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Sets the ID.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the realm ID.
    #[must_use]
    pub fn realm_id(mut self, realm_id: Uuid) -> Self {
        self.realm_id = Some(realm_id);
        self
    }

    /// Sets the provider type.
    #[must_use]
    pub fn provider_type(mut self, provider_type: impl Into<String>) -> Self {
        self.provider_type = Some(provider_type.into());
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets whether the provider is enabled.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Adds a config value.
    #[must_use]
    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Builds the configuration.
    ///
    /// ## Errors
    ///
    /// Returns `FederationError::Configuration` if the realm ID or provider
    /// type is missing. The name defaults to the provider type.
    pub fn build(self) -> FederationResult<FederationConfig> {
        let realm_id = self
            .realm_id
            .ok_or_else(|| FederationError::config("realm_id is required"))?;
        let provider_type = self
            .provider_type
            .filter(|t| !t.is_empty())
            .ok_or_else(|| FederationError::config("provider_type is required"))?;

        Ok(FederationConfig {
            id: self.id.unwrap_or_else(Uuid::now_v7),
            realm_id,
            name: self.name.unwrap_or_else(|| provider_type.clone()),
            provider_type,
            priority: self.priority,
            enabled: self.enabled,
            config: self.config,
        })
    }
}
