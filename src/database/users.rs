// ABOUTME: User table migration and catalog-identity user records
// ABOUTME: Users are created on first login and keyed by their Spotify id
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use sqlx::Row;

/// Stored user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Row id
    pub id: i64,
    /// Spotify user id
    pub spotify_id: String,
    /// Whether a transcript is stored
    pub has_conversation: bool,
    /// Creation time (RFC 3339)
    pub created_at: String,
    /// Last update time (RFC 3339)
    pub updated_at: String,
}

impl Database {
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                spotify_id TEXT UNIQUE NOT NULL,
                conversation TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create users table: {e}")))?;

        Ok(())
    }

    /// Create the user if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn upsert_user(&self, spotify_id: &str) -> AppResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO users (spotify_id, conversation, created_at, updated_at)
            VALUES ($1, NULL, $2, $2)
            ON CONFLICT(spotify_id) DO NOTHING
            ",
        )
        .bind(spotify_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to upsert user: {e}")))?;

        Ok(())
    }

    /// Look up a user by Spotify id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn get_user(&self, spotify_id: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, spotify_id, conversation IS NOT NULL AS has_conversation, created_at, updated_at
            FROM users
            WHERE spotify_id = $1
            ",
        )
        .bind(spotify_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|row| -> Result<UserRecord, sqlx::Error> {
            Ok(UserRecord {
                id: row.try_get("id")?,
                spotify_id: row.try_get("spotify_id")?,
                has_conversation: row.try_get::<i64, _>("has_conversation")? != 0,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            })
        })
        .transpose()
        .map_err(|e| AppError::database(format!("Failed to read user row: {e}")))
    }
}
