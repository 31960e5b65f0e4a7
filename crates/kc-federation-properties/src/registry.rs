//! In-memory registry of external users and secrets.

use std::collections::HashMap;

use kc_federation::{ExternalRecord, ExternalRegistry};

/// Key to secret registry that remembers insertion order.
///
/// Inserting an existing key replaces its secret but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct PropertiesRegistry {
    entries: Vec<ExternalRecord>,
    index: HashMap<String, usize>,
}

impl PropertiesRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, returning true if it replaced an existing secret.
    pub fn insert(&mut self, external_id: impl Into<String>, secret: impl Into<String>) -> bool {
        let external_id = external_id.into();
        let secret = secret.into();

        if let Some(&position) = self.index.get(&external_id) {
            self.entries[position].secret = secret;
            return true;
        }

        self.index.insert(external_id.clone(), self.entries.len());
        self.entries.push(ExternalRecord::new(external_id, secret));
        false
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ExternalRecord> {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertiesRegistry {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (key, value) in iter {
            registry.insert(key, value);
        }
        registry
    }
}

impl ExternalRegistry for PropertiesRegistry {
    fn secret(&self, external_id: &str) -> Option<&str> {
        self.index
            .get(external_id)
            .map(|&position| self.entries[position].secret.as_str())
    }

    fn external_ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.external_id.clone()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn records(&self) -> Vec<ExternalRecord> {
        self.entries.clone()
    }
}
