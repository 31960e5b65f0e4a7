//! # kc-model
//!
//! Domain models for the local identity store.
//!
//! These are the entities a federation provider materializes: users
//! (local accounts), the realm roles granted to them, and the credentials
//! registered against them. Every entity is scoped to a [`Realm`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credential;
pub mod realm;
pub mod role;
pub mod user;

pub use credential::{Credential, CredentialType};
pub use realm::Realm;
pub use role::Role;
pub use user::User;
