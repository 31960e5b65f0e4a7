//! # kc-storage
//!
//! Storage abstraction traits for the local identity store.
//!
//! This crate defines the provider interfaces that concrete storage
//! backends implement. All writes happen through a [`StorageSession`]
//! opened by a [`TransactionManager`], so a unit of work either commits
//! as a whole or leaves no trace.
//!
//! ## Provider Traits
//!
//! - [`RealmProvider`] - realm lookup and creation
//! - [`UserProvider`] - user CRUD and role mappings
//! - [`RoleProvider`] - realm role catalog
//! - [`CredentialProvider`] - user credentials

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credential;
pub mod error;
pub mod realm;
pub mod role;
pub mod session;
pub mod user;

pub use credential::CredentialProvider;
pub use error::{StorageError, StorageResult};
pub use realm::RealmProvider;
pub use role::RoleProvider;
pub use session::{StorageSession, TransactionManager};
pub use user::UserProvider;
