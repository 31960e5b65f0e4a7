//! CLI configuration.

use std::path::{Path, PathBuf};

use kc_federation::ProvisioningPolicy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Registry file.
    pub users_file: Option<PathBuf>,

    /// Local store snapshot file.
    #[serde(default = "default_store_file")]
    pub store_file: PathBuf,

    /// Default realm to operate on.
    pub default_realm: Option<String>,

    /// Display name of the federation provider.
    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    /// Id of the federation provider, recorded on materialized accounts.
    pub provider_id: Option<Uuid>,

    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,

    /// What materialized accounts receive.
    #[serde(default)]
    pub provisioning: ProvisioningPolicy,
}

/// Default store snapshot path.
fn default_store_file() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_default()
        .join(".keycloak")
        .join("federation-store.json")
}

/// Default provider display name.
fn default_provider_name() -> String {
    "properties".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            users_file: None,
            store_file: default_store_file(),
            default_realm: None,
            provider_name: default_provider_name(),
            provider_id: None,
            output_format: OutputFormat::default(),
            provisioning: ProvisioningPolicy::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a file, or defaults if it does not exist.
    pub fn load(path: &Path) -> crate::CliResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses configuration from TOML.
    pub fn parse(content: &str) -> crate::CliResult<Self> {
        toml::from_str(content)
            .map_err(|e| crate::CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> crate::CliResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            crate::CliError::Config(format!("failed to serialize config: {e}"))
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Gets the default configuration file path.
    pub fn default_path() -> crate::CliResult<PathBuf> {
        let home = dirs_next::home_dir().ok_or_else(|| {
            crate::CliError::Config("could not determine home directory".to_string())
        })?;
        Ok(home.join(".keycloak").join("federation.toml"))
    }

    /// Returns the provider id, generating and saving one on first use.
    ///
    /// The id must stay stable across runs because it is recorded as the
    /// federation link of every materialized account.
    pub fn ensure_provider_id(&mut self, path: &Path) -> crate::CliResult<Uuid> {
        if let Some(id) = self.provider_id {
            return Ok(id);
        }

        let id = Uuid::now_v7();
        self.provider_id = Some(id);
        self.save(path)?;
        tracing::info!(provider_id = %id, path = %path.display(), "Generated federation provider id");
        Ok(id)
    }

    /// Gets the effective realm (from args or config).
    pub fn effective_realm(&self, arg_realm: Option<&str>) -> Option<String> {
        arg_realm
            .map(|s| s.to_string())
            .or_else(|| self.default_realm.clone())
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (minimal output).
    Quiet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = CliConfig::parse(
            r#"
            users_file = "/etc/keycloak/users.properties"
            store_file = "/var/lib/keycloak/store.json"
            default_realm = "test"
            output_format = "json"

            [provisioning]
            default_role = "staff"
            sync_credentials = true

            [provisioning.attributes]
            phone = "70000000000"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.users_file,
            Some(PathBuf::from("/etc/keycloak/users.properties"))
        );
        assert_eq!(config.store_file, PathBuf::from("/var/lib/keycloak/store.json"));
        assert_eq!(config.effective_realm(None).as_deref(), Some("test"));
        assert_eq!(config.effective_realm(Some("other")).as_deref(), Some("other"));
        assert_eq!(config.provisioning.default_role.as_deref(), Some("staff"));
        assert!(config.provisioning.sync_credentials);
        assert_eq!(
            config.provisioning.attributes.get("phone").map(String::as_str),
            Some("70000000000")
        );
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = CliConfig::parse("").unwrap();

        assert_eq!(config.provider_name, "properties");
        assert!(config.provider_id.is_none());
        assert_eq!(config.provisioning, ProvisioningPolicy::default());
    }

    #[test]
    fn invalid_config_rejected() {
        let result = CliConfig::parse("users_file = [1, 2]");
        assert!(matches!(result, Err(crate::CliError::Config(_))));
    }

    #[test]
    fn provider_id_generated_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("federation.toml");

        let mut config = CliConfig::default();
        let id = config.ensure_provider_id(&path).unwrap();

        let mut reloaded = CliConfig::load(&path).unwrap();
        assert_eq!(reloaded.ensure_provider_id(&path).unwrap(), id);
    }
}
