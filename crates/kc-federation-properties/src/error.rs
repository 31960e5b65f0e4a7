//! Properties provider error types.
//!
//! ## Security Note
//!
//! Error messages must not include registry secrets.

use std::path::PathBuf;

use kc_federation::FederationError;
use thiserror::Error;

/// Properties provider errors.
#[derive(Debug, Error)]
pub enum PropertiesError {
    /// The registry file could not be read.
    #[error("Failed to read registry file '{}': {source}", path.display())]
    Io {
        /// Path of the registry file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid provider configuration.
    #[error("Properties provider configuration error: {0}")]
    Configuration(String),
}

impl PropertiesError {
    /// Creates an I/O error for a registry file.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Checks if the registry file does not exist.
    #[must_use]
    pub fn is_missing_file(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Result type for properties provider operations.
pub type PropertiesResult<T> = Result<T, PropertiesError>;

impl From<PropertiesError> for FederationError {
    fn from(err: PropertiesError) -> Self {
        match err {
            PropertiesError::Configuration(msg) => FederationError::Configuration(msg),
            PropertiesError::Io { .. } => FederationError::Configuration(err.to_string()),
        }
    }
}
