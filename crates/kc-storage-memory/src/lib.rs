//! # kc-storage-memory
//!
//! In-memory implementation of the `kc-storage` provider traits.
//!
//! Sessions are serialized: [`InMemoryStore::begin`] waits until no other
//! session is open, then works on a private copy of the store that is
//! swapped in on commit. The whole store can be snapshotted to JSON so a
//! command-line tool can keep state between runs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod session;
pub mod state;
pub mod store;

pub use session::MemorySession;
pub use state::StoreState;
pub use store::InMemoryStore;
