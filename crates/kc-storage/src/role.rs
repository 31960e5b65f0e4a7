//! Role storage provider trait.

use async_trait::async_trait;
use kc_model::Role;
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for the realm role catalog.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait RoleProvider: Send + Sync {
    /// Creates a new role.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if a role with the same name exists
    /// in the realm, or `StorageError::NotFound` if the realm doesn't exist.
    async fn create(&self, role: &Role) -> StorageResult<()>;

    /// Gets a role by ID.
    async fn get_by_id(&self, realm_id: Uuid, id: Uuid) -> StorageResult<Option<Role>>;

    /// Gets a realm role by name.
    async fn get_realm_role_by_name(
        &self,
        realm_id: Uuid,
        name: &str,
    ) -> StorageResult<Option<Role>>;

    /// Lists all realm roles.
    async fn list_realm_roles(&self, realm_id: Uuid) -> StorageResult<Vec<Role>>;
}
