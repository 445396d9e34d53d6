// ABOUTME: Per-browser session context holding identity, access token and the pending track list
// ABOUTME: Defines the session store trait, backend selection and cookie-bound session loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! # Session Context
//!
//! A session is keyed by a random ID carried in an `HttpOnly` cookie. Its
//! payload is [`SessionData`], serialized as JSON into the configured
//! [`SessionStore`] backend.

/// Session cookie helpers
pub mod cookies;
/// In-memory LRU session store
pub mod memory;
/// Redis session store
pub mod redis;

pub use self::memory::InMemorySessionStore;
pub use self::redis::RedisSessionStore;

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::constants::session as session_defaults;
use crate::errors::AppResult;
use crate::spotify::TrackUri;

/// Data held for one browser session
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Catalog user identity, set after a successful callback
    #[serde(default)]
    pub user_id: Option<String>,
    /// Catalog access token, set after a successful callback
    #[serde(default)]
    pub access_token: Option<String>,
    /// Tracks awaiting the user's confirmation
    #[serde(default)]
    pub pending_tracks: Option<Vec<TrackUri>>,
    /// OAuth `state` issued by `/login`
    #[serde(default)]
    pub oauth_state: Option<String>,
    /// PKCE verifier issued by `/login`
    #[serde(default)]
    pub pkce_verifier: Option<String>,
}

impl SessionData {
    /// Whether the session carries both identity and credential
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user_id.is_some() && self.access_token.is_some()
    }
}

impl fmt::Debug for SessionData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionData")
            .field("user_id", &self.user_id)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "pending_tracks",
                &self.pending_tracks.as_ref().map(Vec::len),
            )
            .field("oauth_state", &self.oauth_state.is_some())
            .field("pkce_verifier", &self.pkce_verifier.is_some())
            .finish()
    }
}

/// Session storage backend
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Backend name for logging
    fn backend_name(&self) -> &'static str;

    /// Load a session; `None` when unknown or expired
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails
    async fn load(&self, session_id: &str) -> AppResult<Option<SessionData>>;

    /// Store a session, refreshing its TTL
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails
    async fn save(&self, session_id: &str, data: &SessionData) -> AppResult<()>;

    /// Remove a session
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails
    async fn destroy(&self, session_id: &str) -> AppResult<()>;

    /// Check backend connectivity
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend is unreachable
    async fn health_check(&self) -> AppResult<()>;
}

/// Create the session store selected by configuration
///
/// Uses Redis when `REDIS_URL` is configured, otherwise an in-memory LRU store.
///
/// # Errors
///
/// Returns an error if the Redis connection cannot be established
pub async fn create_session_store(config: &SessionConfig) -> AppResult<Arc<dyn SessionStore>> {
    let ttl = Duration::from_secs(config.ttl_secs);

    if let Some(redis_url) = &config.redis_url {
        info!("Initializing Redis session store");
        let store = RedisSessionStore::connect(redis_url, ttl).await?;
        return Ok(Arc::new(store));
    }

    info!(
        "Initializing in-memory session store (max entries: {})",
        config.max_entries
    );
    let cleanup_interval = (config.cleanup_interval_secs > 0)
        .then(|| Duration::from_secs(config.cleanup_interval_secs));
    Ok(Arc::new(InMemorySessionStore::new(
        config.max_entries,
        ttl,
        cleanup_interval,
    )))
}

/// Generate a new random session ID
#[must_use]
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Session bound to the current request
#[derive(Debug, Clone)]
pub struct ActiveSession {
    /// Session ID carried in the cookie
    pub id: String,
    /// Session payload
    pub data: SessionData,
    /// Whether the cookie must be (re)issued on the response
    pub is_new: bool,
}

impl ActiveSession {
    /// Resolve the session named by the request cookie, or start a fresh one
    ///
    /// A fresh session is not stored until [`SessionStore::save`] is called.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails
    pub async fn from_headers(store: &dyn SessionStore, headers: &HeaderMap) -> AppResult<Self> {
        if let Some(id) = cookies::get_cookie_value(headers, session_defaults::COOKIE_NAME) {
            if let Some(data) = store.load(&id).await? {
                return Ok(Self {
                    id,
                    data,
                    is_new: false,
                });
            }
            debug!("Session cookie refers to an unknown or expired session");
        }

        Ok(Self {
            id: new_session_id(),
            data: SessionData::default(),
            is_new: true,
        })
    }

    /// Persist the session payload
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails
    pub async fn save(&self, store: &dyn SessionStore) -> AppResult<()> {
        store.save(&self.id, &self.data).await
    }

    /// Move the payload to a fresh ID, destroying the old record
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend fails
    pub async fn rotate(&mut self, store: &dyn SessionStore) -> AppResult<()> {
        if !self.is_new {
            store.destroy(&self.id).await?;
        }
        self.id = new_session_id();
        self.is_new = true;
        Ok(())
    }
}
