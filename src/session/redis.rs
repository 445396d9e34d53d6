// ABOUTME: Redis session store with connection management and TTL expiry
// ABOUTME: Shares sessions across server instances and survives restarts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use super::{SessionData, SessionStore};
use crate::constants::session::REDIS_KEY_PREFIX;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{error, info, warn};

/// Connection attempts before giving up at startup
const INITIAL_CONNECTION_RETRIES: u32 = 3;
/// First retry delay in milliseconds
const INITIAL_RETRY_DELAY_MS: u64 = 500;
/// Retry delay cap in milliseconds
const MAX_RETRY_DELAY_MS: u64 = 5_000;
/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;
/// Response timeout in seconds
const RESPONSE_TIMEOUT_SECS: u64 = 3;

/// Redis-backed session store
///
/// Sessions are stored as JSON under `REDIS_KEY_PREFIX` + session ID and
/// expire through `SET EX`.
#[derive(Clone)]
pub struct RedisSessionStore {
    manager: ConnectionManager,
    ttl: Duration,
}

impl RedisSessionStore {
    /// Connect to Redis, retrying with exponential backoff
    ///
    /// # Errors
    ///
    /// Returns a storage error if the URL is invalid or every attempt fails
    pub async fn connect(redis_url: &str, ttl: Duration) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::storage(format!("Failed to create Redis client: {e}")))?;

        let manager = Self::connect_with_retry(&client).await?;
        info!("Connected to Redis session store");

        Ok(Self { manager, ttl })
    }

    async fn connect_with_retry(client: &redis::Client) -> AppResult<ConnectionManager> {
        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
            .set_response_timeout(Duration::from_secs(RESPONSE_TIMEOUT_SECS))
            .set_max_delay(MAX_RETRY_DELAY_MS);

        let mut last_error = None;
        let mut delay_ms = INITIAL_RETRY_DELAY_MS;

        for attempt in 0..=INITIAL_CONNECTION_RETRIES {
            match ConnectionManager::new_with_config(client.clone(), manager_config.clone()).await
            {
                Ok(manager) => {
                    if attempt > 0 {
                        info!("Redis connection established after {attempt} retries");
                    }
                    return Ok(manager);
                }
                Err(e) => {
                    if attempt < INITIAL_CONNECTION_RETRIES {
                        warn!(
                            "Redis connection attempt {}/{} failed, retrying in {delay_ms}ms: {e}",
                            attempt + 1,
                            INITIAL_CONNECTION_RETRIES + 1,
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                        delay_ms = (delay_ms * 2).min(MAX_RETRY_DELAY_MS);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(AppError::storage(format!(
            "Failed to connect to Redis after {} attempts: {}",
            INITIAL_CONNECTION_RETRIES + 1,
            last_error.map_or_else(|| "unknown error".to_owned(), |e| e.to_string())
        )))
    }

    fn build_key(session_id: &str) -> String {
        format!("{REDIS_KEY_PREFIX}{session_id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn load(&self, session_id: &str) -> AppResult<Option<SessionData>> {
        let mut conn = self.manager.clone();

        let raw: Option<Vec<u8>> = conn.get(Self::build_key(session_id)).await.map_err(|e| {
            error!("Redis GET failed: {e}");
            AppError::from(e)
        })?;

        raw.map(|bytes| {
            serde_json::from_slice(&bytes)
                .map_err(|e| AppError::storage(format!("Corrupt session record: {e}")))
        })
        .transpose()
    }

    async fn save(&self, session_id: &str, data: &SessionData) -> AppResult<()> {
        let serialized = serde_json::to_vec(data)
            .map_err(|e| AppError::storage(format!("Session serialization failed: {e}")))?;
        let mut conn = self.manager.clone();

        conn.set_ex::<_, _, ()>(Self::build_key(session_id), serialized, self.ttl.as_secs())
            .await
            .map_err(|e| {
                error!("Redis SET failed: {e}");
                AppError::from(e)
            })
    }

    async fn destroy(&self, session_id: &str) -> AppResult<()> {
        let mut conn = self.manager.clone();

        conn.del::<_, ()>(Self::build_key(session_id))
            .await
            .map_err(|e| {
                error!("Redis DEL failed: {e}");
                AppError::from(e)
            })
    }

    async fn health_check(&self) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_key_uses_prefix() {
        assert_eq!(
            RedisSessionStore::build_key("abc123"),
            "playlist_chat:session:abc123"
        );
    }
}
