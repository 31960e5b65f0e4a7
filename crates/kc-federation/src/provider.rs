//! User federation provider traits.
//!
//! ## NIST 800-53 Rev5 Controls
//!
//! - IA-2: Identification and Authentication (Organizational Users)
//! - IA-5: Authenticator Management
//!
//! These traits let an external identity source answer lookups and verify
//! secrets while the local store stays the system of record.

use uuid::Uuid;

use crate::config::FederationConfig;
use crate::error::FederationResult;
use crate::storage_id::StorageId;
use crate::user::{CredentialInput, VirtualUser};

// ============================================================================
// User Lookup
// ============================================================================

/// Resolves external identifiers to virtual users.
///
/// Lookups are pure reads against the external source. They never touch
/// the local store and a miss is `None`, not an error.
pub trait UserLookupProvider: Send + Sync {
    /// Returns the provider configuration.
    fn config(&self) -> &FederationConfig;

    /// Returns the provider type identifier.
    fn provider_type(&self) -> &'static str;

    /// Gets a user by username (the external id).
    fn get_user_by_username(&self, realm_id: Uuid, username: &str) -> Option<VirtualUser>;

    /// Gets a user by composite storage id.
    ///
    /// The external id is extracted from the composite id and resolved as
    /// a username.
    ///
    /// ## Errors
    ///
    /// Returns `FederationError::MalformedId` if `id` cannot be decomposed.
    fn get_user_by_id(&self, realm_id: Uuid, id: &str) -> FederationResult<Option<VirtualUser>> {
        let storage_id = StorageId::parse(id)?;
        Ok(self.get_user_by_username(realm_id, storage_id.external_id()))
    }

    /// Gets a user by email.
    ///
    /// Registries without an email index never match.
    fn get_user_by_email(&self, _realm_id: Uuid, _email: &str) -> Option<VirtualUser> {
        None
    }
}

// ============================================================================
// Credential Validator
// ============================================================================

/// Validates credentials against an external source.
///
/// ## NIST 800-53 Rev5: IA-5
///
/// Credential validators must:
/// - Not log or store plaintext secrets outside the local credential store
/// - Compare secrets without data-dependent timing
#[allow(async_fn_in_trait)]
pub trait CredentialValidator: Send + Sync {
    /// Checks if the provider can validate credentials of this type.
    fn supports_credential_type(&self, credential_type: &str) -> bool;

    /// Checks if the provider holds a credential of this type for the user.
    fn is_configured_for(&self, user: &VirtualUser, credential_type: &str) -> bool;

    /// Validates a submitted credential.
    ///
    /// Returns `Ok(false)` for unsupported types, unknown users, and wrong
    /// secrets. A successful validation may have side effects on the local
    /// store (see the implementing provider).
    ///
    /// ## Errors
    ///
    /// Returns an error if a side effect of a successful validation fails.
    ///
    /// ## Security
    ///
    /// `input.value` must never be logged.
    async fn is_valid(
        &self,
        realm_id: Uuid,
        user: &VirtualUser,
        input: &CredentialInput,
    ) -> FederationResult<bool>;
}
