// ABOUTME: SQLite persistence for users, their interview transcripts and created playlists
// ABOUTME: Opens the pool, runs idempotent migrations and exposes the transcript store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! # Database Management
//!
//! One row per catalog user holds the serialized interview transcript. Created
//! playlists are kept in a separate audit table.

mod playlists;
mod transcripts;
mod users;

pub use playlists::PlaylistRecord;
pub use transcripts::{SqliteTranscriptStore, TranscriptStore};
pub use users::UserRecord;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::errors::{AppError, AppResult};

/// Database manager for users, transcripts and playlists
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let connected = if is_memory_url(database_url) {
            // Every connection to `:memory:` opens a separate database
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(database_url)
                .await
        } else {
            // Ensure SQLite creates the database file if it doesn't exist
            let connection_options =
                if database_url.starts_with("sqlite:") && !database_url.contains('?') {
                    format!("{database_url}?mode=rwc")
                } else {
                    database_url.to_owned()
                };
            SqlitePoolOptions::new().connect(&connection_options).await
        };
        let pool = connected
            .map_err(|e| AppError::database(format!("Failed to connect to database: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;

        info!("Database ready");
        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if a migration statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_playlists().await?;
        Ok(())
    }

    /// Check that the database answers queries
    ///
    /// # Errors
    ///
    /// Returns an error if the probe query fails
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database health check failed: {e}")))?;
        Ok(())
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
