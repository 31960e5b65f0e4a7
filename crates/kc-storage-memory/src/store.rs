//! The shared in-memory store.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use kc_storage::{StorageError, StorageResult, StorageSession, TransactionManager};
use tokio::sync::Mutex;

use crate::session::MemorySession;
use crate::state::StoreState;

/// In-memory local identity store.
///
/// Cloning is cheap; clones share the same contents.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given contents.
    #[must_use]
    pub fn from_state(state: StoreState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Begins a session, waiting for any open session to finish.
    pub async fn begin_session(&self) -> MemorySession {
        MemorySession::new(self.state.clone().lock_owned().await)
    }

    /// Returns a copy of the committed contents.
    pub async fn snapshot(&self) -> StoreState {
        self.state.lock().await.clone()
    }

    /// Loads a store from a JSON snapshot file.
    ///
    /// A missing file yields an empty store.
    ///
    /// ## Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let state: StoreState = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Serialization(e.to_string()))?;
                tracing::debug!(
                    path = %path.display(),
                    users = state.users.len(),
                    "Loaded store snapshot"
                );
                Ok(Self::from_state(state))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No store snapshot, starting empty");
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the committed contents to a JSON snapshot file.
    ///
    /// ## Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    pub async fn save(&self, path: impl AsRef<Path>) -> StorageResult<()> {
        let path = path.as_ref();
        let state = self.snapshot().await;
        let bytes = serde_json::to_vec_pretty(&state)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl TransactionManager for InMemoryStore {
    async fn begin(&self) -> StorageResult<Box<dyn StorageSession>> {
        Ok(Box::new(self.begin_session().await))
    }
}
