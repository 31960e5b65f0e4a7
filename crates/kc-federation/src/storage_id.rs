//! Composite storage identifiers.
//!
//! A federated user is addressed from outside the provider by an id of
//! the form `<provider>.<external id>`. The id is split at the first
//! separator, so external ids may themselves contain dots
//! (`saas.maria.smith@example.com`).

use std::fmt;
use std::str::FromStr;

use crate::error::{FederationError, FederationResult};

/// Separator between the provider scope and the external id.
pub const SEPARATOR: char = '.';

/// A composite id naming a user inside a federation provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageId {
    provider_id: String,
    external_id: String,
}

impl StorageId {
    /// Creates a storage id from its parts.
    #[must_use]
    pub fn new(provider_id: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            external_id: external_id.into(),
        }
    }

    /// Decomposes a composite id.
    ///
    /// ## Errors
    ///
    /// Returns `FederationError::MalformedId` if the separator is missing or
    /// either part is empty.
    pub fn parse(id: &str) -> FederationResult<Self> {
        match id.split_once(SEPARATOR) {
            Some((provider, external)) if !provider.is_empty() && !external.is_empty() => {
                Ok(Self::new(provider, external))
            }
            _ => Err(FederationError::malformed_id(id)),
        }
    }

    /// Returns the provider scope.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// Returns the external id.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.provider_id, self.external_id)
    }
}

impl FromStr for StorageId {
    type Err = FederationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
