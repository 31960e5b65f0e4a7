//! End-to-end tests for the properties user federation provider.
//!
//! The tests live under `tests/`; this crate has no library code.
