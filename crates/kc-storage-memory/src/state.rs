//! Store contents and the constraints enforced on them.

use std::collections::HashMap;

use kc_model::{Credential, Realm, Role, User};
use kc_storage::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum username length accepted by the store.
pub const MAX_USERNAME_LENGTH: usize = 255;

/// Everything held by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    /// Realms by ID.
    #[serde(default)]
    pub realms: HashMap<Uuid, Realm>,
    /// Users by ID.
    #[serde(default)]
    pub users: HashMap<Uuid, User>,
    /// Roles by ID.
    #[serde(default)]
    pub roles: HashMap<Uuid, Role>,
    /// Role IDs granted to each user ID.
    #[serde(default)]
    pub role_mappings: HashMap<Uuid, Vec<Uuid>>,
    /// Credentials in creation order.
    #[serde(default)]
    pub credentials: Vec<Credential>,
}

impl StoreState {
    pub(crate) fn insert_realm(&mut self, realm: &Realm) -> StorageResult<()> {
        if self.realms.values().any(|r| r.name == realm.name) {
            return Err(StorageError::duplicate("Realm", "name", &realm.name));
        }
        self.realms.insert(realm.id, realm.clone());
        Ok(())
    }

    pub(crate) fn realm_by_name(&self, name: &str) -> Option<&Realm> {
        self.realms.values().find(|r| r.name == name)
    }

    fn require_realm(&self, realm_id: Uuid) -> StorageResult<()> {
        if self.realms.contains_key(&realm_id) {
            Ok(())
        } else {
            Err(StorageError::not_found("Realm", realm_id))
        }
    }

    pub(crate) fn user_by_username(&self, realm_id: Uuid, username: &str) -> Option<&User> {
        self.users
            .values()
            .find(|u| u.realm_id == realm_id && u.username == username)
    }

    fn user_in_realm(&self, realm_id: Uuid, user_id: Uuid) -> Option<&User> {
        self.users.get(&user_id).filter(|u| u.realm_id == realm_id)
    }

    pub(crate) fn insert_user(&mut self, user: &User) -> StorageResult<()> {
        self.require_realm(user.realm_id)?;
        validate_username(&user.username)?;
        if self.user_by_username(user.realm_id, &user.username).is_some() {
            return Err(StorageError::duplicate("User", "username", &user.username));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    pub(crate) fn replace_user(&mut self, user: &User) -> StorageResult<()> {
        if self.user_in_realm(user.realm_id, user.id).is_none() {
            return Err(StorageError::not_found("User", user.id));
        }
        validate_username(&user.username)?;
        let taken = self
            .user_by_username(user.realm_id, &user.username)
            .is_some_and(|existing| existing.id != user.id);
        if taken {
            return Err(StorageError::duplicate("User", "username", &user.username));
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    pub(crate) fn realm_users(&self, realm_id: Uuid) -> impl Iterator<Item = &User> {
        self.users.values().filter(move |u| u.realm_id == realm_id)
    }

    pub(crate) fn insert_role(&mut self, role: &Role) -> StorageResult<()> {
        self.require_realm(role.realm_id)?;
        if self.role_by_name(role.realm_id, &role.name).is_some() {
            return Err(StorageError::duplicate("Role", "name", &role.name));
        }
        self.roles.insert(role.id, role.clone());
        Ok(())
    }

    pub(crate) fn role_by_name(&self, realm_id: Uuid, name: &str) -> Option<&Role> {
        self.roles
            .values()
            .find(|r| r.realm_id == realm_id && r.name == name)
    }

    pub(crate) fn role_in_realm(&self, realm_id: Uuid, role_id: Uuid) -> Option<&Role> {
        self.roles.get(&role_id).filter(|r| r.realm_id == realm_id)
    }

    pub(crate) fn grant(&mut self, realm_id: Uuid, user_id: Uuid, role_id: Uuid) -> StorageResult<()> {
        if self.user_in_realm(realm_id, user_id).is_none() {
            return Err(StorageError::not_found("User", user_id));
        }
        if self.role_in_realm(realm_id, role_id).is_none() {
            return Err(StorageError::not_found("Role", role_id));
        }
        let granted = self.role_mappings.entry(user_id).or_default();
        if !granted.contains(&role_id) {
            granted.push(role_id);
        }
        Ok(())
    }

    pub(crate) fn roles_of(&self, realm_id: Uuid, user_id: Uuid) -> Vec<Uuid> {
        if self.user_in_realm(realm_id, user_id).is_none() {
            return Vec::new();
        }
        self.role_mappings.get(&user_id).cloned().unwrap_or_default()
    }

    pub(crate) fn insert_credential(&mut self, credential: &Credential) -> StorageResult<()> {
        if self
            .user_in_realm(credential.realm_id, credential.user_id)
            .is_none()
        {
            return Err(StorageError::not_found("User", credential.user_id));
        }
        self.credentials.push(credential.clone());
        Ok(())
    }

    pub(crate) fn credentials_of(&self, realm_id: Uuid, user_id: Uuid) -> Vec<Credential> {
        self.credentials
            .iter()
            .filter(|c| c.realm_id == realm_id && c.user_id == user_id)
            .cloned()
            .collect()
    }
}

/// Rejects usernames the store cannot hold.
fn validate_username(username: &str) -> StorageResult<()> {
    if username.trim().is_empty() {
        return Err(StorageError::invalid("username cannot be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(StorageError::invalid(format!(
            "username exceeds {MAX_USERNAME_LENGTH} characters"
        )));
    }
    Ok(())
}
