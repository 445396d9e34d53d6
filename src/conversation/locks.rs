// ABOUTME: Keyed async mutex serializing chat turns per user identity
// ABOUTME: Prevents concurrent turns from racing on the transcript read-modify-write
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Idle locks are pruned once the map grows beyond this many keys
const PRUNE_THRESHOLD: usize = 256;

/// Per-identity turn locks
///
/// Holding the guard returned by [`TurnLocks::acquire`] gives exclusive access
/// to one identity's transcript. Different identities never contend.
#[derive(Debug, Clone, Default)]
pub struct TurnLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl TurnLocks {
    /// Create an empty lock set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `key`
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        if self.locks.len() > PRUNE_THRESHOLD {
            self.prune_idle();
        }

        let lock = Arc::clone(
            self.locks
                .entry(key.to_owned())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );

        lock.lock_owned().await
    }

    /// Number of identities with a lock entry
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no lock entries exist
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn prune_idle(&self) {
        // Only the map holds an idle lock
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = TurnLocks::new();
        let guard = locks.acquire("user-1").await;

        let contender = locks.clone();
        let waiter = tokio::spawn(async move {
            let _guard = contender.acquire("user-1").await;
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let locks = TurnLocks::new();
        let _first = locks.acquire("user-1").await;
        let second =
            tokio::time::timeout(Duration::from_millis(100), locks.acquire("user-2")).await;
        assert!(second.is_ok());
        assert_eq!(locks.len(), 2);
    }
}
