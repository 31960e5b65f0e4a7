//! Per-key async mutual exclusion.
//!
//! Materializing a federated user is a check-then-create sequence. Holding
//! the lock for the user's external id across that sequence means two
//! concurrent logins for the same user produce one local account.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A set of async mutexes keyed by string.
///
/// Entries are created on demand and removed when the last holder or
/// waiter releases them, so the map only holds keys that are in use.
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Creates an empty lock set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, waiting for the current holder.
    pub async fn lock(&self, key: &str) -> KeyedLockGuard {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        KeyedLockGuard {
            guard: Some(mutex.lock_owned().await),
            locks: Arc::clone(&self.locks),
            key: key.to_string(),
        }
    }

    /// Returns the number of keys currently held or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Returns true if no key is held or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Holds the lock for one key until dropped.
#[derive(Debug)]
pub struct KeyedLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    key: String,
}

impl KeyedLockGuard {
    /// Returns the key this guard holds.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyedLockGuard {
    fn drop(&mut self) {
        // Release first so the map's reference is the only one left when
        // nobody else is waiting.
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn entries_removed_after_release() {
        let locks = KeyedLocks::new();

        {
            let guard = locks.lock("alice").await;
            assert_eq!(guard.key(), "alice");
            assert_eq!(locks.len(), 1);
        }

        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::new();

        let _alice = locks.lock("alice").await;
        let bob = tokio::time::timeout(Duration::from_millis(100), locks.lock("bob")).await;

        assert!(bob.is_ok());
    }

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let inside = Arc::clone(&inside);
            let max_inside = Arc::clone(&max_inside);
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock("alice").await;
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                max_inside.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }
}
