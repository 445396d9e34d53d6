// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Holds prompt texts, extraction markers, service endpoints and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! Constants module
//!
//! The marker strings in [`markers`] form a contract with the instruction
//! messages in [`prompts`]: the prompts ask the model to emit exactly the
//! shapes the extraction code recognizes.

/// Instruction, greeting and confirmation texts
pub mod prompts;

/// Literal markers shared between the prompts and track extraction
pub mod markers {
    /// User reply that confirms saving the pending playlist (compared trimmed, case-insensitive)
    pub const CONFIRMATION_TOKEN: &str = "yes";

    /// Phrase that opens a named-title recommendation (compared case-insensitive)
    pub const NAMED_LIST_MARKER: &str = "here are your tracks";

    /// Pattern matching one catalog-native track identifier
    pub const TRACK_URI_PATTERN: &str = r"spotify:track:[A-Za-z0-9]+";
}

/// Service names used in error messages and logs
pub mod service_names {
    /// Crate service name
    pub const PLAYLIST_CHAT_SERVER: &str = "playlist-chat-server";
    /// Completion API
    pub const COMPLETION_API: &str = "OpenAI";
    /// Music catalog
    pub const SPOTIFY: &str = "Spotify";
}

/// Spotify Web API and accounts endpoints
pub mod spotify {
    /// Web API base URL
    pub const API_BASE_URL: &str = "https://api.spotify.com/v1";
    /// Accounts service base URL
    pub const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
    /// Authorization path on the accounts service
    pub const AUTHORIZE_PATH: &str = "/authorize";
    /// Token path on the accounts service
    pub const TOKEN_PATH: &str = "/api/token";
    /// Scopes needed to read the profile and write playlists
    pub const DEFAULT_SCOPES: &str =
        "user-read-private user-read-email playlist-modify-public playlist-modify-private";
    /// Description attached to every created playlist
    pub const PLAYLIST_DESCRIPTION: &str = "Created with playlist-chat app";
    /// Maximum URIs accepted by one add-tracks request
    pub const MAX_TRACKS_PER_REQUEST: usize = 100;
}

/// Completion API defaults
pub mod completion {
    /// Default API base URL
    pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
    /// Model used for interview turns
    pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
    /// Model used to name playlists
    pub const DEFAULT_NAMING_MODEL: &str = "gpt-4";
    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Request timeout in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
}

/// Session defaults
pub mod session {
    /// Cookie carrying the session id
    pub const COOKIE_NAME: &str = "playlist_chat_sid";
    /// Session lifetime in seconds
    pub const DEFAULT_TTL_SECS: u64 = 86_400;
    /// Maximum sessions held by the in-memory store
    pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
    /// Expired-session sweep interval in seconds
    pub const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
    /// Redis key prefix for session records
    pub const REDIS_KEY_PREFIX: &str = "playlist_chat:session:";
    /// Random bytes in the OAuth state parameter
    pub const OAUTH_STATE_BYTES: usize = 16;
}

/// Server defaults
pub mod server {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 4000;
    /// Default SQLite database URL
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/playlist_chat.db";
    /// Default frontend URL (the callback redirects to `{FRONTEND_URL}chat`)
    pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000/";
    /// Default allowed CORS origin
    pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";
    /// Per-request timeout applied by the HTTP layer, in seconds
    pub const REQUEST_TIMEOUT_SECS: u64 = 180;
}
