// ABOUTME: Audit records of playlists created through the chat
// ABOUTME: Inserts are best effort; callers log failures instead of surfacing them
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::spotify::CreatedPlaylist;
use sqlx::Row;

/// Stored playlist audit record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRecord {
    /// Spotify playlist id
    pub spotify_id: String,
    /// Playlist name
    pub name: String,
    /// Playlist description
    pub description: Option<String>,
    /// Whether the playlist is public
    pub public: bool,
    /// Creation time (RFC 3339)
    pub created_at: String,
}

impl Database {
    pub(super) async fn migrate_playlists(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS playlists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                spotify_id TEXT UNIQUE NOT NULL,
                name TEXT NOT NULL,
                description TEXT,
                public BOOLEAN NOT NULL DEFAULT 0,
                user_id INTEGER REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create playlists table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_playlists_user_id ON playlists(user_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to create playlists index: {e}")))?;

        Ok(())
    }

    /// Record a playlist created for a user
    ///
    /// Recording the same playlist twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn record_playlist(
        &self,
        spotify_user_id: &str,
        playlist: &CreatedPlaylist,
    ) -> AppResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r"
            INSERT INTO playlists (spotify_id, name, description, public, user_id, created_at)
            VALUES ($1, $2, $3, $4, (SELECT id FROM users WHERE spotify_id = $5), $6)
            ON CONFLICT(spotify_id) DO NOTHING
            ",
        )
        .bind(&playlist.id)
        .bind(&playlist.name)
        .bind(playlist.description.as_deref())
        .bind(playlist.public.unwrap_or(false))
        .bind(spotify_user_id)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record playlist: {e}")))?;

        Ok(())
    }

    /// Playlists recorded for a user, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn playlists_for_user(
        &self,
        spotify_user_id: &str,
    ) -> AppResult<Vec<PlaylistRecord>> {
        let rows = sqlx::query(
            r"
            SELECT p.spotify_id, p.name, p.description, p.public, p.created_at
            FROM playlists p
            JOIN users u ON u.id = p.user_id
            WHERE u.spotify_id = $1
            ORDER BY p.id ASC
            ",
        )
        .bind(spotify_user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list playlists: {e}")))?;

        rows.into_iter()
            .map(|row| -> Result<PlaylistRecord, sqlx::Error> {
                Ok(PlaylistRecord {
                    spotify_id: row.try_get("spotify_id")?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    public: row.try_get("public")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::database(format!("Failed to read playlist row: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(id: &str) -> CreatedPlaylist {
        CreatedPlaylist {
            id: id.to_owned(),
            name: "Night Drive".to_owned(),
            description: Some("Created with playlist-chat app".to_owned()),
            public: Some(false),
        }
    }

    #[tokio::test]
    async fn test_record_playlist_links_user() {
        let db = Database::new("sqlite::memory:").await.unwrap();
        db.upsert_user("listener").await.unwrap();

        db.record_playlist("listener", &playlist("pl-1")).await.unwrap();
        db.record_playlist("listener", &playlist("pl-1")).await.unwrap();
        db.record_playlist("listener", &playlist("pl-2")).await.unwrap();

        let records = db.playlists_for_user("listener").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].spotify_id, "pl-1");
        assert_eq!(records[0].name, "Night Drive");
        assert!(!records[0].public);
    }
}
