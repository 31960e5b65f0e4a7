//! External registry abstraction.
//!
//! An external registry is a read-only mapping from external id to secret.
//! Providers never mutate it; it is loaded once and shared.

use std::fmt;

/// A single entry of an external registry.
#[derive(Clone, PartialEq, Eq)]
pub struct ExternalRecord {
    /// External id (the registry key).
    pub external_id: String,
    /// Secret stored for the id.
    pub secret: String,
}

impl ExternalRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(external_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for ExternalRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalRecord")
            .field("external_id", &self.external_id)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

/// Read-only key to secret lookup over an external identity source.
pub trait ExternalRegistry: Send + Sync {
    /// Returns the secret stored for `external_id`, if any.
    fn secret(&self, external_id: &str) -> Option<&str>;

    /// Returns every external id in the registry, in registry order.
    fn external_ids(&self) -> Vec<String>;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns true if the registry has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks if the registry knows `external_id`.
    fn contains(&self, external_id: &str) -> bool {
        self.secret(external_id).is_some()
    }

    /// Returns every entry as an owned record.
    fn records(&self) -> Vec<ExternalRecord> {
        self.external_ids()
            .into_iter()
            .filter_map(|id| {
                let secret = self.secret(&id)?.to_string();
                Some(ExternalRecord::new(id, secret))
            })
            .collect()
    }
}
