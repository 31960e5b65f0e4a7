//! End-to-End Integration Tests
//!
//! These tests drive the properties provider against the in-memory store,
//! loading registries from real files.

mod bulk_sync;
mod common;
mod jit_provisioning;
