//! Session over a private copy of the store.

use async_trait::async_trait;
use kc_model::{Credential, Realm, Role, User};
use kc_storage::user::UserSearchCriteria;
use kc_storage::{
    CredentialProvider, RealmProvider, RoleProvider, StorageError, StorageResult, StorageSession,
    UserProvider,
};
use parking_lot::Mutex;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::state::StoreState;

/// Open session state: the exclusive hold on the shared store plus the
/// working copy that will replace it on commit.
struct Staged {
    shared: OwnedMutexGuard<StoreState>,
    working: StoreState,
}

/// A session of an [`InMemoryStore`](crate::InMemoryStore).
///
/// Holds the store exclusively until it is committed, rolled back, or
/// dropped. Dropping an open session discards its changes.
pub struct MemorySession {
    staged: Mutex<Option<Staged>>,
}

impl MemorySession {
    pub(crate) fn new(shared: OwnedMutexGuard<StoreState>) -> Self {
        let working = shared.clone();
        Self {
            staged: Mutex::new(Some(Staged { shared, working })),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> StorageResult<T> {
        let staged = self.staged.lock();
        let staged = staged.as_ref().ok_or_else(closed)?;
        Ok(f(&staged.working))
    }

    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> StorageResult<T>) -> StorageResult<T> {
        let mut staged = self.staged.lock();
        let staged = staged.as_mut().ok_or_else(closed)?;
        f(&mut staged.working)
    }

    fn close(&self) -> StorageResult<Staged> {
        self.staged.lock().take().ok_or_else(closed)
    }
}

fn closed() -> StorageError {
    StorageError::transaction("session is closed")
}

#[async_trait]
impl StorageSession for MemorySession {
    fn realms(&self) -> &dyn RealmProvider {
        self
    }

    fn users(&self) -> &dyn UserProvider {
        self
    }

    fn roles(&self) -> &dyn RoleProvider {
        self
    }

    fn credentials(&self) -> &dyn CredentialProvider {
        self
    }

    fn is_active(&self) -> bool {
        self.staged.lock().is_some()
    }

    async fn commit(&self) -> StorageResult<()> {
        let Staged {
            mut shared,
            working,
        } = self.close()?;
        *shared = working;
        tracing::trace!("in-memory session committed");
        Ok(())
    }

    async fn rollback(&self) -> StorageResult<()> {
        self.close()?;
        tracing::trace!("in-memory session rolled back");
        Ok(())
    }
}

#[async_trait]
impl RealmProvider for MemorySession {
    async fn create(&self, realm: &Realm) -> StorageResult<()> {
        self.write(|state| state.insert_realm(realm))
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Realm>> {
        self.read(|state| state.realms.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> StorageResult<Option<Realm>> {
        self.read(|state| state.realm_by_name(name).cloned())
    }

    async fn list(&self) -> StorageResult<Vec<Realm>> {
        self.read(|state| {
            let mut realms: Vec<Realm> = state.realms.values().cloned().collect();
            realms.sort_by(|a, b| a.name.cmp(&b.name));
            realms
        })
    }
}

#[async_trait]
impl UserProvider for MemorySession {
    async fn create(&self, user: &User) -> StorageResult<()> {
        self.write(|state| state.insert_user(user))
    }

    async fn update(&self, user: &User) -> StorageResult<()> {
        self.write(|state| state.replace_user(user))
    }

    async fn get_by_id(&self, realm_id: Uuid, id: Uuid) -> StorageResult<Option<User>> {
        self.read(|state| {
            state
                .users
                .get(&id)
                .filter(|u| u.realm_id == realm_id)
                .cloned()
        })
    }

    async fn get_by_username(&self, realm_id: Uuid, username: &str) -> StorageResult<Option<User>> {
        self.read(|state| state.user_by_username(realm_id, username).cloned())
    }

    async fn search(
        &self,
        realm_id: Uuid,
        criteria: &UserSearchCriteria,
    ) -> StorageResult<Vec<User>> {
        self.read(|state| {
            let mut users: Vec<User> = state
                .realm_users(realm_id)
                .filter(|u| criteria.matches(u))
                .cloned()
                .collect();
            users.sort_by(|a, b| a.username.cmp(&b.username));
            users
                .into_iter()
                .skip(criteria.offset.unwrap_or(0))
                .take(criteria.max_results.unwrap_or(usize::MAX))
                .collect()
        })
    }

    async fn count(&self, realm_id: Uuid) -> StorageResult<u64> {
        self.read(|state| state.realm_users(realm_id).count() as u64)
    }

    async fn grant_role(&self, realm_id: Uuid, user_id: Uuid, role_id: Uuid) -> StorageResult<()> {
        self.write(|state| state.grant(realm_id, user_id, role_id))
    }

    async fn get_roles(&self, realm_id: Uuid, user_id: Uuid) -> StorageResult<Vec<Uuid>> {
        self.read(|state| state.roles_of(realm_id, user_id))
    }
}

#[async_trait]
impl RoleProvider for MemorySession {
    async fn create(&self, role: &Role) -> StorageResult<()> {
        self.write(|state| state.insert_role(role))
    }

    async fn get_by_id(&self, realm_id: Uuid, id: Uuid) -> StorageResult<Option<Role>> {
        self.read(|state| state.role_in_realm(realm_id, id).cloned())
    }

    async fn get_realm_role_by_name(
        &self,
        realm_id: Uuid,
        name: &str,
    ) -> StorageResult<Option<Role>> {
        self.read(|state| state.role_by_name(realm_id, name).cloned())
    }

    async fn list_realm_roles(&self, realm_id: Uuid) -> StorageResult<Vec<Role>> {
        self.read(|state| {
            let mut roles: Vec<Role> = state
                .roles
                .values()
                .filter(|r| r.realm_id == realm_id)
                .cloned()
                .collect();
            roles.sort_by(|a, b| a.name.cmp(&b.name));
            roles
        })
    }
}

#[async_trait]
impl CredentialProvider for MemorySession {
    async fn create(&self, credential: &Credential) -> StorageResult<()> {
        self.write(|state| state.insert_credential(credential))
    }

    async fn list_by_user(&self, realm_id: Uuid, user_id: Uuid) -> StorageResult<Vec<Credential>> {
        self.read(|state| state.credentials_of(realm_id, user_id))
    }
}
