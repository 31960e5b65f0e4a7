//! Transient federated user views and credential input.

use std::fmt;

use kc_model::CredentialType;
use uuid::Uuid;

use crate::storage_id::StorageId;

/// A user known to an external registry but not necessarily to the local
/// store.
///
/// Lives only for the duration of a call and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualUser {
    /// Id of the provider that resolved the user.
    pub provider_id: String,
    /// Realm the lookup was made in.
    pub realm_id: Uuid,
    /// External id, also used as the local username.
    pub external_id: String,
}

impl VirtualUser {
    /// Creates a virtual user.
    #[must_use]
    pub fn new(provider_id: impl Into<String>, realm_id: Uuid, external_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            realm_id,
            external_id: external_id.into(),
        }
    }

    /// Returns the username a materialized account will carry.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.external_id
    }

    /// Returns the composite storage id for this user.
    #[must_use]
    pub fn storage_id(&self) -> StorageId {
        StorageId::new(&self.provider_id, &self.external_id)
    }
}

/// A credential submitted for validation.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialInput {
    /// Credential type name (e.g., "password", "otp").
    pub credential_type: String,
    /// Submitted value.
    pub value: String,
}

impl CredentialInput {
    /// Creates a credential input of any type.
    #[must_use]
    pub fn new(credential_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            credential_type: credential_type.into(),
            value: value.into(),
        }
    }

    /// Creates a password input.
    #[must_use]
    pub fn password(value: impl Into<String>) -> Self {
        Self::new(CredentialType::Password.as_str(), value)
    }

    /// Checks if this input is a password.
    #[must_use]
    pub fn is_password(&self) -> bool {
        CredentialType::parse(&self.credential_type) == Some(CredentialType::Password)
    }
}

impl fmt::Debug for CredentialInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialInput")
            .field("credential_type", &self.credential_type)
            .field("value", &"[REDACTED]")
            .finish()
    }
}
