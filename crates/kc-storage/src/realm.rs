//! Realm storage provider trait.

use async_trait::async_trait;
use kc_model::Realm;
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for realm storage operations.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait RealmProvider: Send + Sync {
    /// Creates a new realm.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if a realm with the same name exists.
    async fn create(&self, realm: &Realm) -> StorageResult<()>;

    /// Gets a realm by ID.
    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Realm>>;

    /// Gets a realm by name.
    async fn get_by_name(&self, name: &str) -> StorageResult<Option<Realm>>;

    /// Lists all realms.
    async fn list(&self) -> StorageResult<Vec<Realm>>;

    /// Checks if a realm exists by name.
    async fn exists_by_name(&self, name: &str) -> StorageResult<bool> {
        Ok(self.get_by_name(name).await?.is_some())
    }
}
