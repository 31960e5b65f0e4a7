//! # kc-cli
//!
//! Command-line front end for the properties user federation provider.
//!
//! This crate provides:
//! - Registry lookups by username or composite id
//! - Password logins with just-in-time account provisioning
//! - Full and changed-since imports of the registry
//! - Minimal realm, role and user management of the local store

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};
