//! Role domain model.
//!
//! Roles live in the realm's role catalog. Federation never creates them;
//! it only looks one up by name and grants it to materialized users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A realm role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier.
    pub id: Uuid,
    /// Role name (unique within the realm).
    pub name: String,
    /// Role description.
    pub description: Option<String>,
    /// Realm this role belongs to.
    pub realm_id: Uuid,
    /// When the role was created.
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Creates a new realm role.
    #[must_use]
    pub fn new_realm_role(realm_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            description: None,
            realm_id,
            created_at: Utc::now(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realm_role_creation() {
        let realm_id = Uuid::now_v7();
        let role = Role::new_realm_role(realm_id, "montage").with_description("Field crew");

        assert_eq!(role.name, "montage");
        assert_eq!(role.realm_id, realm_id);
        assert_eq!(role.description.as_deref(), Some("Field crew"));
    }
}
