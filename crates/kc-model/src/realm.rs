//! Realm domain model.
//!
//! A realm is the top-level container for users and roles. Federation
//! providers are configured per realm and only ever write into it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    /// Unique identifier.
    pub id: Uuid,
    /// Unique realm name.
    pub name: String,
    /// Display name for UI.
    pub display_name: Option<String>,
    /// Whether the realm is enabled.
    pub enabled: bool,
    /// When the realm was created.
    pub created_at: DateTime<Utc>,
}

impl Realm {
    /// Creates a new, enabled realm.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            display_name: None,
            enabled: true,
            created_at: Utc::now(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}
