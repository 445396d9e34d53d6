// ABOUTME: Transcript store contract and its SQLite implementation on the users table
// ABOUTME: Transcripts are stored as a JSON array of per-message JSON records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use async_trait::async_trait;
use sqlx::Row;

use super::Database;
use crate::conversation::{deserialize_transcript, serialize_transcript};
use crate::errors::{AppError, AppResult};
use crate::llm::ChatMessage;

/// Per-user transcript persistence
///
/// Writes replace the whole transcript; there is no append.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Read a user's transcript
    ///
    /// # Errors
    ///
    /// Returns a deserialization error when a stored record cannot be parsed,
    /// or a database error when the read fails
    async fn read(&self, user_id: &str) -> AppResult<Option<Vec<ChatMessage>>>;

    /// Replace a user's transcript
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    async fn write(&self, user_id: &str, transcript: &[ChatMessage]) -> AppResult<()>;

    /// Forget a user's transcript
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    async fn clear(&self, user_id: &str) -> AppResult<()>;
}

/// [`TranscriptStore`] backed by the `users.conversation` column
#[derive(Clone)]
pub struct SqliteTranscriptStore {
    database: Database,
}

impl SqliteTranscriptStore {
    /// Create a store over an opened database
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl TranscriptStore for SqliteTranscriptStore {
    async fn read(&self, user_id: &str) -> AppResult<Option<Vec<ChatMessage>>> {
        let row = sqlx::query("SELECT conversation FROM users WHERE spotify_id = $1")
            .bind(user_id)
            .fetch_optional(self.database.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to read transcript: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let stored: Option<String> = row
            .try_get("conversation")
            .map_err(|e| AppError::database(format!("Failed to read transcript column: {e}")))?;
        let Some(stored) = stored else {
            return Ok(None);
        };

        let records: Vec<String> = serde_json::from_str(&stored).map_err(|e| {
            AppError::deserialization(format!("Stored transcript is not a record list: {e}"))
        })?;

        deserialize_transcript(&records).map(Some)
    }

    async fn write(&self, user_id: &str, transcript: &[ChatMessage]) -> AppResult<()> {
        let records = serialize_transcript(transcript)?;
        let stored = serde_json::to_string(&records)
            .map_err(|e| AppError::internal(format!("Failed to encode transcript: {e}")))?;
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO users (spotify_id, conversation, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT(spotify_id) DO UPDATE SET
                conversation = excluded.conversation,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id)
        .bind(&stored)
        .bind(&now)
        .execute(self.database.pool())
        .await
        .map_err(|e| AppError::database(format!("Failed to write transcript: {e}")))?;

        Ok(())
    }

    async fn clear(&self, user_id: &str) -> AppResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query("UPDATE users SET conversation = NULL, updated_at = $1 WHERE spotify_id = $2")
            .bind(&now)
            .bind(user_id)
            .execute(self.database.pool())
            .await
            .map_err(|e| AppError::database(format!("Failed to clear transcript: {e}")))?;

        Ok(())
    }
}
