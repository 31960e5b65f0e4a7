//! Credential storage provider trait.

use async_trait::async_trait;
use kc_model::{Credential, CredentialType};
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for credential storage operations.
///
/// Implementations must be thread-safe and support concurrent access.
///
/// ## Security Note
///
/// Credential data should be encrypted at rest and must never be logged.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Creates a new credential.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the owning user doesn't exist.
    async fn create(&self, credential: &Credential) -> StorageResult<()>;

    /// Lists all credentials for a user, in creation order.
    async fn list_by_user(&self, realm_id: Uuid, user_id: Uuid) -> StorageResult<Vec<Credential>>;

    /// Lists credentials of a specific type for a user.
    async fn list_by_type(
        &self,
        realm_id: Uuid,
        user_id: Uuid,
        credential_type: CredentialType,
    ) -> StorageResult<Vec<Credential>> {
        let credentials = self.list_by_user(realm_id, user_id).await?;
        Ok(credentials
            .into_iter()
            .filter(|c| c.credential_type == credential_type)
            .collect())
    }

    /// Gets the password credential for a user (if any).
    async fn get_password(
        &self,
        realm_id: Uuid,
        user_id: Uuid,
    ) -> StorageResult<Option<Credential>> {
        let credentials = self
            .list_by_type(realm_id, user_id, CredentialType::Password)
            .await?;
        Ok(credentials.into_iter().next())
    }
}
