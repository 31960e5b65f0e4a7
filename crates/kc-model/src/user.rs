//! User domain model.
//!
//! A user is a local account within a realm. Federated users start out as
//! virtual views over an external registry and become a [`User`] once they
//! are materialized into the local store.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A local user account.
///
/// Role mappings and credentials are owned by the store and kept
/// alongside the user rather than inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    // === Identity ===
    /// Unique identifier.
    pub id: Uuid,
    /// Realm this user belongs to.
    pub realm_id: Uuid,
    /// Unique username within the realm.
    pub username: String,
    /// Whether the user account is enabled.
    pub enabled: bool,

    // === Timestamps ===
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,

    // === Federation ===
    /// Id of the federation provider this account was materialized from.
    pub federation_link: Option<String>,

    // === Custom Attributes ===
    /// Custom user attributes.
    pub attributes: HashMap<String, Vec<String>>,
}

impl User {
    /// Creates a new, disabled user with the given username.
    ///
    /// Accounts are enabled explicitly once provisioning has set them up.
    #[must_use]
    pub fn new(realm_id: Uuid, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            realm_id,
            username: username.into(),
            enabled: false,
            created_at: now,
            updated_at: now,
            federation_link: None,
            attributes: HashMap::new(),
        }
    }

    /// Links the user to a federation provider.
    #[must_use]
    pub fn with_federation_link(mut self, provider_id: impl Into<String>) -> Self {
        self.federation_link = Some(provider_id.into());
        self
    }

    /// Sets whether the user is enabled.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Checks if this is a federated user.
    #[must_use]
    pub const fn is_federated(&self) -> bool {
        self.federation_link.is_some()
    }

    /// Gets an attribute value.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Vec<String>> {
        self.attributes.get(name)
    }

    /// Gets the first value of an attribute.
    #[must_use]
    pub fn get_first_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Sets an attribute value.
    pub fn set_attribute(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.attributes.insert(name.into(), values);
        self.updated_at = Utc::now();
    }

    /// Replaces an attribute with a single value.
    pub fn set_single_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set_attribute(name, vec![value.into()]);
    }
}
