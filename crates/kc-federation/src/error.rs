//! Federation error types.
//!
//! Lookup misses and rejected credentials are not errors: they surface as
//! `None` or `false`. The variants here cover caller bugs (malformed ids),
//! configuration problems, and failures that must abort a unit of work.

use kc_storage::StorageError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during federation operations.
#[derive(Debug, Error)]
pub enum FederationError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A composite storage id could not be decomposed.
    #[error("Malformed storage id: '{0}'")]
    MalformedId(String),

    /// The target realm does not exist in the local store.
    #[error("Realm not found: {0}")]
    RealmNotFound(Uuid),

    /// Materializing a federated user failed; nothing was kept for it.
    #[error("Provisioning failed for '{external_id}': {source}")]
    Provisioning {
        /// External ID of the user being materialized.
        external_id: String,
        /// Store failure that aborted the remaining steps.
        #[source]
        source: StorageError,
    },

    /// Synchronization error. The sync scope was rolled back.
    #[error("Synchronization error: {0}")]
    Sync(String),

    /// Provider is read-only.
    #[error("Provider is read-only: cannot {0}")]
    ReadOnly(String),

    /// Storage error outside of a provisioning step.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl FederationError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a malformed id error.
    #[must_use]
    pub fn malformed_id(id: impl Into<String>) -> Self {
        Self::MalformedId(id.into())
    }

    /// Creates a provisioning error for a user.
    #[must_use]
    pub fn provisioning(external_id: impl Into<String>, source: StorageError) -> Self {
        Self::Provisioning {
            external_id: external_id.into(),
            source,
        }
    }

    /// Creates a sync error.
    #[must_use]
    pub fn sync(msg: impl Into<String>) -> Self {
        Self::Sync(msg.into())
    }

    /// Creates a read-only error.
    #[must_use]
    pub fn read_only(operation: impl Into<String>) -> Self {
        Self::ReadOnly(operation.into())
    }

    /// Checks if this error was caused by bad caller input.
    #[must_use]
    pub const fn is_malformed_input(&self) -> bool {
        matches!(self, Self::MalformedId(_))
    }

    /// Checks if this is a provisioning failure.
    #[must_use]
    pub const fn is_provisioning_error(&self) -> bool {
        matches!(self, Self::Provisioning { .. })
    }
}

/// Result type for federation operations.
pub type FederationResult<T> = Result<T, FederationError>;
