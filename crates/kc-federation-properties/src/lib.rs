//! # kc-federation-properties
//!
//! Federation provider backed by a `key=value` properties file.
//!
//! Each key is an external user id and each value its secret. The file is
//! loaded once and never written. Users known only to the file can log
//! in; the first successful login materializes a local account. The
//! factory can also import every entry in one all-or-nothing sync.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod factory;
pub mod loader;
pub mod provider;
pub mod registry;

pub use config::PropertiesProviderConfig;
pub use error::{PropertiesError, PropertiesResult};
pub use factory::{PropertiesProviderFactory, PROVIDER_ID};
pub use provider::PropertiesStorageProvider;
pub use registry::PropertiesRegistry;
