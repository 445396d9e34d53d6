// ABOUTME: Music catalog abstraction for track search and playlist materialization
// ABOUTME: Defines the catalog trait, track URI newtype and Spotify response models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! # Music Catalog
//!
//! The conversation engine resolves song titles and builds playlists through
//! [`MusicCatalog`]. [`SpotifyClient`] is the production implementation.

mod client;

pub use client::SpotifyClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::AppResult;

/// Catalog-native track identifier (`spotify:track:<id>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackUri(String);

impl TrackUri {
    /// Wrap a track URI
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// Borrow the URI text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Playlist returned by the catalog after creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPlaylist {
    /// Catalog playlist ID
    pub id: String,
    /// Playlist name
    pub name: String,
    /// Playlist description
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the playlist is public
    #[serde(default)]
    pub public: Option<bool>,
}

/// Authenticated catalog user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyUser {
    /// Catalog user ID (the user identity across the app)
    pub id: String,
    /// Display name, when shared
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Music catalog used to resolve titles and materialize playlists
#[async_trait]
pub trait MusicCatalog: Send + Sync {
    /// Resolve a free-text title to the best-matching track
    ///
    /// Returns `Ok(None)` when the catalog has no match.
    ///
    /// # Errors
    ///
    /// Returns an `UpstreamService` error when the catalog request fails
    async fn search_track(&self, access_token: &str, title: &str) -> AppResult<Option<TrackUri>>;

    /// Create a private playlist under the user's account
    ///
    /// # Errors
    ///
    /// Returns an `UpstreamService` error when the catalog request fails
    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
    ) -> AppResult<CreatedPlaylist>;

    /// Append tracks to a playlist, preserving order
    ///
    /// # Errors
    ///
    /// Returns an `UpstreamService` error when any catalog request fails
    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        tracks: &[TrackUri],
    ) -> AppResult<()>;

    /// Fetch the user owning the access token
    ///
    /// # Errors
    ///
    /// Returns an `UpstreamService` error when the catalog request fails
    async fn current_user(&self, access_token: &str) -> AppResult<SpotifyUser>;
}
