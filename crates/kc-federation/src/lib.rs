//! # kc-federation
//!
//! User federation framework.
//!
//! Federation providers expose users that live in an external identity
//! source. This crate provides the pieces shared by every provider:
//!
//! - [`provider`] - lookup and credential validation traits
//! - [`registry`] - the read-only key to secret source a provider reads
//! - [`storage_id`] - composite ids that carry a provider scope and an external id
//! - [`provisioning`] - materialization of federated users as local accounts
//! - [`sync`] - bulk import results and the import synchronization trait
//! - [`lock`] - per-user mutual exclusion for concurrent materialization

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod lock;
pub mod provider;
pub mod provisioning;
pub mod registry;
pub mod storage_id;
pub mod sync;
pub mod user;

pub use config::FederationConfig;
pub use error::{FederationError, FederationResult};
pub use provider::{CredentialValidator, UserLookupProvider};
pub use provisioning::{Provisioned, ProvisioningPolicy, ProvisioningRequest};
pub use registry::{ExternalRecord, ExternalRegistry};
pub use storage_id::StorageId;
pub use sync::{ImportSynchronization, SyncResult};
pub use user::{CredentialInput, VirtualUser};
