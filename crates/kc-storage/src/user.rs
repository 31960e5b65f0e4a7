//! User storage provider trait.

use async_trait::async_trait;
use kc_model::User;
use uuid::Uuid;

use crate::error::StorageResult;

/// Provider for user storage operations.
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Creates a new user.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if a user with the same username exists,
    /// `StorageError::InvalidData` if the username is rejected by the store.
    async fn create(&self, user: &User) -> StorageResult<()>;

    /// Updates an existing user.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the user doesn't exist.
    async fn update(&self, user: &User) -> StorageResult<()>;

    /// Gets a user by ID.
    async fn get_by_id(&self, realm_id: Uuid, id: Uuid) -> StorageResult<Option<User>>;

    /// Gets a user by username.
    async fn get_by_username(&self, realm_id: Uuid, username: &str) -> StorageResult<Option<User>>;

    /// Searches for users matching criteria.
    async fn search(
        &self,
        realm_id: Uuid,
        criteria: &UserSearchCriteria,
    ) -> StorageResult<Vec<User>>;

    /// Counts users in a realm.
    async fn count(&self, realm_id: Uuid) -> StorageResult<u64>;

    /// Grants a role to a user.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the user or role doesn't exist.
    async fn grant_role(&self, realm_id: Uuid, user_id: Uuid, role_id: Uuid) -> StorageResult<()>;

    /// Gets the roles granted to a user.
    async fn get_roles(&self, realm_id: Uuid, user_id: Uuid) -> StorageResult<Vec<Uuid>>;

    /// Checks if a user has a specific role.
    async fn has_role(&self, realm_id: Uuid, user_id: Uuid, role_id: Uuid) -> StorageResult<bool> {
        Ok(self.get_roles(realm_id, user_id).await?.contains(&role_id))
    }

    /// Checks if a user exists by username.
    async fn exists_by_username(&self, realm_id: Uuid, username: &str) -> StorageResult<bool> {
        Ok(self.get_by_username(realm_id, username).await?.is_some())
    }
}

/// Search criteria for users.
#[derive(Debug, Default, Clone)]
pub struct UserSearchCriteria {
    /// Search string (substring match on username).
    pub search: Option<String>,
    /// Filter by enabled status.
    pub enabled: Option<bool>,
    /// Filter by federation link.
    pub federation_link: Option<String>,
    /// Maximum results to return.
    pub max_results: Option<usize>,
    /// Offset for pagination.
    pub offset: Option<usize>,
}

impl UserSearchCriteria {
    /// Creates a new search criteria.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            search: None,
            enabled: None,
            federation_link: None,
            max_results: None,
            offset: None,
        }
    }

    /// Sets the search string.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Filters by enabled status.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Filters by federation link.
    #[must_use]
    pub fn federation_link(mut self, provider_id: impl Into<String>) -> Self {
        self.federation_link = Some(provider_id.into());
        self
    }

    /// Sets maximum results.
    #[must_use]
    pub const fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Sets offset for pagination.
    #[must_use]
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Checks whether a user matches the filters (pagination excluded).
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        if let Some(search) = &self.search {
            if !user.username.contains(search.as_str()) {
                return false;
            }
        }
        if let Some(enabled) = self.enabled {
            if user.enabled != enabled {
                return false;
            }
        }
        if let Some(link) = &self.federation_link {
            if user.federation_link.as_deref() != Some(link.as_str()) {
                return false;
            }
        }
        true
    }
}
