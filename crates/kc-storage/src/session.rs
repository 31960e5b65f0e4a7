//! Transactional storage sessions.
//!
//! A [`StorageSession`] is one unit of work against the local store. Every
//! read and write made through its providers is isolated until
//! [`StorageSession::commit`]; [`StorageSession::rollback`] (or dropping the
//! session without committing) discards them.
//!
//! Once a session has been committed or rolled back it is closed, and any
//! further provider call returns `StorageError::Transaction`.

use async_trait::async_trait;

use crate::credential::CredentialProvider;
use crate::error::StorageResult;
use crate::realm::RealmProvider;
use crate::role::RoleProvider;
use crate::user::UserProvider;

/// Opens transactional sessions against a store.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// Begins a new session.
    ///
    /// Implementations may wait for conflicting sessions to finish.
    async fn begin(&self) -> StorageResult<Box<dyn StorageSession>>;
}

/// A single transactional unit of work.
#[async_trait]
pub trait StorageSession: Send + Sync {
    /// Realm operations within this session.
    fn realms(&self) -> &dyn RealmProvider;

    /// User operations within this session.
    fn users(&self) -> &dyn UserProvider;

    /// Role operations within this session.
    fn roles(&self) -> &dyn RoleProvider;

    /// Credential operations within this session.
    fn credentials(&self) -> &dyn CredentialProvider;

    /// Returns true until the session is committed or rolled back.
    fn is_active(&self) -> bool;

    /// Makes every change in this session durable and closes it.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Transaction` if the session is already closed.
    async fn commit(&self) -> StorageResult<()>;

    /// Discards every change in this session and closes it.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Transaction` if the session is already closed.
    async fn rollback(&self) -> StorageResult<()>;
}
