// ABOUTME: In-memory session store with LRU eviction and TTL expiry
// ABOUTME: Includes a background cleanup task that stops when the last handle is dropped
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use super::{SessionData, SessionStore};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, RwLock};

/// Stored session payload with expiration
#[derive(Debug, Clone)]
struct SessionEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl SessionEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

type SharedStore = Arc<RwLock<LruCache<String, SessionEntry>>>;

/// In-memory session store
///
/// The least recently used session is evicted once `max_entries` is reached.
/// Expired entries are dropped on access and by the optional cleanup task.
#[derive(Clone)]
pub struct InMemorySessionStore {
    store: SharedStore,
    ttl: Duration,
    // Dropping the last clone closes the channel, which stops the cleanup task
    _shutdown_tx: Option<Arc<mpsc::Sender<()>>>,
}

impl InMemorySessionStore {
    /// Capacity used when zero entries are configured
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1000) {
        Some(n) => n,
        None => unreachable!(),
    };

    /// Create a store; a cleanup task is spawned when `cleanup_interval` is set
    ///
    /// Spawning requires a running Tokio runtime.
    #[must_use]
    pub fn new(max_entries: usize, ttl: Duration, cleanup_interval: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        let store: SharedStore = Arc::new(RwLock::new(LruCache::new(capacity)));

        let shutdown_tx = cleanup_interval.map(|interval_duration| {
            let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
            let store_clone = Arc::clone(&store);

            tokio::spawn(async move {
                let mut interval = tokio::time::interval(interval_duration);
                loop {
                    tokio::select! {
                        _ = interval.tick() => {
                            Self::cleanup_expired(&store_clone).await;
                        }
                        _ = shutdown_rx.recv() => {
                            tracing::debug!("Session cleanup task stopped");
                            break;
                        }
                    }
                }
            });

            Arc::new(shutdown_tx)
        });

        Self {
            store,
            ttl,
            _shutdown_tx: shutdown_tx,
        }
    }

    /// Remove all expired sessions
    async fn cleanup_expired(store: &SharedStore) {
        let mut guard = store.write().await;

        let expired: Vec<String> = guard
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            guard.pop(key);
        }
        drop(guard);

        if !expired.is_empty() {
            tracing::debug!("Cleaned up {} expired sessions", expired.len());
        }
    }

    /// Number of sessions currently held, expired ones included
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Whether the store holds no sessions
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self, session_id: &str) -> AppResult<Option<SessionData>> {
        let mut store = self.store.write().await;

        let Some(entry) = store.get(session_id) else {
            return Ok(None);
        };

        if entry.is_expired() {
            store.pop(session_id);
            return Ok(None);
        }

        let data = serde_json::from_slice(&entry.data)
            .map_err(|e| AppError::storage(format!("Corrupt session record: {e}")))?;
        Ok(Some(data))
    }

    async fn save(&self, session_id: &str, data: &SessionData) -> AppResult<()> {
        let serialized = serde_json::to_vec(data)
            .map_err(|e| AppError::storage(format!("Session serialization failed: {e}")))?;

        self.store
            .write()
            .await
            .push(session_id.to_owned(), SessionEntry::new(serialized, self.ttl));

        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> AppResult<()> {
        self.store.write().await.pop(session_id);
        Ok(())
    }

    async fn health_check(&self) -> AppResult<()> {
        Ok(())
    }
}
