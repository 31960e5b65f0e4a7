//! Properties provider configuration.
//!
//! Read from the provider's [`FederationConfig`] map:
//!
//! | Key                | Meaning                                        |
//! |--------------------|------------------------------------------------|
//! | `usersFile`        | path of the registry file                      |
//! | `defaultRole`      | role granted on materialization, empty = none  |
//! | `attribute.<name>` | attribute template entry (replaces the default) |
//! | `syncCredentials`  | register registry secrets during bulk sync     |

use std::path::PathBuf;

use kc_federation::{FederationConfig, ProvisioningPolicy};

use crate::error::{PropertiesError, PropertiesResult};

/// Config key for the registry file path.
pub const USERS_FILE_KEY: &str = "usersFile";

/// Config key for the default role name.
pub const DEFAULT_ROLE_KEY: &str = "defaultRole";

/// Config key prefix for attribute template entries.
pub const ATTRIBUTE_PREFIX: &str = "attribute.";

/// Config key for credential registration during sync.
pub const SYNC_CREDENTIALS_KEY: &str = "syncCredentials";

/// Settings of a properties provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PropertiesProviderConfig {
    /// Registry file. Without one the provider serves an empty registry.
    pub users_file: Option<PathBuf>,

    /// What materialized accounts receive.
    pub policy: ProvisioningPolicy,
}

impl PropertiesProviderConfig {
    /// Reads the settings from a federation config.
    ///
    /// Keys that are absent keep their defaults.
    ///
    /// ## Errors
    ///
    /// Returns `PropertiesError::Configuration` if a value cannot be parsed.
    pub fn from_federation_config(config: &FederationConfig) -> PropertiesResult<Self> {
        let users_file = config
            .get(USERS_FILE_KEY)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let mut policy = ProvisioningPolicy::default();

        if let Some(role) = config.get(DEFAULT_ROLE_KEY) {
            let role = role.trim();
            policy = policy.with_default_role((!role.is_empty()).then(|| role.to_string()));
        }

        let attributes = config.with_prefix(ATTRIBUTE_PREFIX);
        if !attributes.is_empty() {
            policy = policy.with_attributes(attributes);
        }

        if let Some(raw) = config.get(SYNC_CREDENTIALS_KEY) {
            let sync_credentials = raw.trim().parse::<bool>().map_err(|_| {
                PropertiesError::config(format!(
                    "{SYNC_CREDENTIALS_KEY} must be 'true' or 'false', got '{raw}'"
                ))
            })?;
            policy = policy.with_sync_credentials(sync_credentials);
        }

        Ok(Self { users_file, policy })
    }
}
