//! Synchronization support for federation providers.
//!
//! Provides the trait and result type for bulk import of users from an
//! external identity source into the local store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FederationResult;

// ============================================================================
// Sync Results
// ============================================================================

/// Result of a synchronization operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    /// Number of accounts created.
    pub added: usize,

    /// Number of entries that already had an account.
    pub skipped: usize,

    /// When the sync started.
    pub started_at: DateTime<Utc>,

    /// When the sync completed.
    pub completed_at: DateTime<Utc>,

    /// Status message.
    pub status: String,
}

impl SyncResult {
    /// Creates a new sync result.
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            added: 0,
            skipped: 0,
            started_at,
            completed_at: started_at,
            status: String::new(),
        }
    }

    /// Marks the sync as complete.
    #[must_use]
    pub fn complete(mut self) -> Self {
        self.completed_at = Utc::now();
        self.status = format!(
            "Sync completed: {} added, {} skipped",
            self.added, self.skipped
        );
        self
    }

    /// Records an account creation.
    pub fn record_added(&mut self) {
        self.added += 1;
    }

    /// Records an entry whose account already existed.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Returns the total number of entries processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.skipped
    }
}

// ============================================================================
// Import Synchronization Trait
// ============================================================================

/// Trait for providers that support bulk import.
///
/// A sync run is all-or-nothing: either every entry of the external
/// source is materialized and committed together, or nothing is.
#[allow(async_fn_in_trait)]
pub trait ImportSynchronization: Send + Sync {
    /// Performs a full synchronization.
    ///
    /// Materializes an account for every entry of the external source.
    ///
    /// ## Errors
    ///
    /// Returns `FederationError::RealmNotFound` if the realm does not exist
    /// and `FederationError::Sync` if any entry fails. In both cases
    /// nothing is written.
    async fn sync_full(&self, realm_id: Uuid) -> FederationResult<SyncResult>;

    /// Performs a changed-only synchronization.
    ///
    /// Sources without change tracking run a full sync and ignore `since`.
    ///
    /// ## Errors
    ///
    /// Same as [`sync_full`](Self::sync_full).
    async fn sync_changed(&self, realm_id: Uuid, since: DateTime<Utc>) -> FederationResult<SyncResult>;

    /// Returns true if the provider tracks changes for `sync_changed`.
    fn supports_changed_sync(&self) -> bool {
        false
    }
}
