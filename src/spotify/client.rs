// ABOUTME: Spotify Web API client implementing track search and playlist creation
// ABOUTME: Uses bearer access tokens from the session and maps failures to upstream errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use super::{CreatedPlaylist, MusicCatalog, SpotifyUser, TrackUri};
use crate::constants::{service_names, spotify};
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::api_client;

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Search endpoint response
#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

/// Page of track results
#[derive(Debug, Deserialize)]
struct TrackPage {
    items: Vec<TrackItem>,
}

/// Track in a search result
#[derive(Debug, Deserialize)]
struct TrackItem {
    uri: String,
}

/// Create-playlist request body
#[derive(Debug, Serialize)]
struct CreatePlaylistBody<'a> {
    name: &'a str,
    description: &'a str,
    public: bool,
}

/// Add-tracks request body
#[derive(Debug, Serialize)]
struct AddTracksBody<'a> {
    uris: Vec<&'a str>,
}

/// Spotify error envelope
#[derive(Debug, Deserialize)]
struct SpotifyErrorResponse {
    error: SpotifyErrorDetail,
}

/// Spotify error detail
#[derive(Debug, Deserialize)]
struct SpotifyErrorDetail {
    message: String,
}

// ============================================================================
// Client Implementation
// ============================================================================

/// Spotify Web API client
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    base_url: String,
}

impl SpotifyClient {
    /// Create a client against the given Web API base URL
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: api_client(),
            base_url: base_url.into(),
        }
    }

    /// Build the API URL for a given path
    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Send an authorized request and decode the JSON body
    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
        access_token: &str,
        action: &str,
    ) -> AppResult<T> {
        let body = Self::send(request, access_token, action).await?;
        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse Spotify {action} response: {e}");
            AppError::upstream(
                service_names::SPOTIFY,
                format!("Failed to parse {action} response: {e}"),
            )
        })
    }

    /// Send an authorized request and return the raw body on success
    async fn send(request: RequestBuilder, access_token: &str, action: &str) -> AppResult<String> {
        let response = request
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                error!("Spotify {action} request failed: {e}");
                AppError::upstream(service_names::SPOTIFY, format!("{action} failed: {e}"))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            AppError::upstream(
                service_names::SPOTIFY,
                format!("Failed to read {action} response: {e}"),
            )
        })?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(Self::parse_error_response(status, &body, action))
        }
    }

    /// Translate a non-success response into an upstream error
    fn parse_error_response(status: StatusCode, body: &str, action: &str) -> AppError {
        let detail = serde_json::from_str::<SpotifyErrorResponse>(body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |parsed| parsed.error.message,
        );

        let message = match status {
            StatusCode::UNAUTHORIZED => {
                format!("{action} rejected the access token, log in again: {detail}")
            }
            StatusCode::FORBIDDEN => format!("{action} is not permitted for this user: {detail}"),
            StatusCode::TOO_MANY_REQUESTS => format!("{action} was rate limited: {detail}"),
            _ => format!("{action} failed ({status}): {detail}"),
        };

        error!("Spotify error: {message}");
        AppError::upstream(service_names::SPOTIFY, message)
    }
}

#[async_trait]
impl MusicCatalog for SpotifyClient {
    #[instrument(skip(self, access_token))]
    async fn search_track(&self, access_token: &str, title: &str) -> AppResult<Option<TrackUri>> {
        let request = self
            .client
            .get(self.api_url("search"))
            .query(&[("q", title), ("type", "track"), ("limit", "1")]);

        let response: SearchResponse = Self::send_json(request, access_token, "search").await?;

        let uri = response
            .tracks
            .items
            .into_iter()
            .next()
            .map(|item| TrackUri::new(item.uri));

        if uri.is_none() {
            debug!("No track found for title");
        }

        Ok(uri)
    }

    #[instrument(skip(self, access_token))]
    async fn create_playlist(
        &self,
        access_token: &str,
        user_id: &str,
        name: &str,
    ) -> AppResult<CreatedPlaylist> {
        let path = format!("users/{}/playlists", encode_path_segment(user_id));
        let request = self.client.post(self.api_url(&path)).json(&CreatePlaylistBody {
            name,
            description: spotify::PLAYLIST_DESCRIPTION,
            public: false,
        });

        let playlist: CreatedPlaylist =
            Self::send_json(request, access_token, "create playlist").await?;

        info!(playlist_id = %playlist.id, "Created Spotify playlist");
        Ok(playlist)
    }

    #[instrument(skip(self, access_token, tracks), fields(track_count = tracks.len()))]
    async fn add_tracks(
        &self,
        access_token: &str,
        playlist_id: &str,
        tracks: &[TrackUri],
    ) -> AppResult<()> {
        let path = format!("playlists/{}/tracks", encode_path_segment(playlist_id));

        for chunk in tracks.chunks(spotify::MAX_TRACKS_PER_REQUEST) {
            let request = self.client.post(self.api_url(&path)).json(&AddTracksBody {
                uris: chunk.iter().map(TrackUri::as_str).collect(),
            });
            Self::send(request, access_token, "add tracks").await?;
        }

        Ok(())
    }

    #[instrument(skip(self, access_token))]
    async fn current_user(&self, access_token: &str) -> AppResult<SpotifyUser> {
        let request = self.client.get(self.api_url("me"));
        Self::send_json(request, access_token, "fetch profile").await
    }
}

/// Percent-encode an ID for use as a single URL path segment
fn encode_path_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
