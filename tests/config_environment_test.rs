// ABOUTME: Tests for environment-driven server configuration
// ABOUTME: Serialized because they mutate process environment variables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use playlist_chat::config::{Environment, ServerConfig};
use playlist_chat::conversation::RecommendationFormat;
use serial_test::serial;
use std::env;

const VARS: [&str; 12] = [
    "HTTP_PORT",
    "ENVIRONMENT",
    "DATABASE_URL",
    "REDIS_URL",
    "SESSION_TTL_SECS",
    "SPOTIFY_CLIENT_ID",
    "SPOTIFY_CLIENT_SECRET",
    "SPOTIFY_SCOPES",
    "OPENAI_API_KEY",
    "OPENAI_CHAT_MODEL",
    "FRONTEND_URL",
    "RECOMMENDATION_FORMAT",
];

fn clear_vars() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_in_development() {
    clear_vars();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.http_port, 4000);
    assert_eq!(config.environment, Environment::Development);
    assert!(config.session.redis_url.is_none());
    assert_eq!(config.completion.chat_model, "gpt-3.5-turbo");
    assert_eq!(config.completion.naming_model, "gpt-4");
    assert_eq!(config.frontend_url, "http://localhost:3000/");
    assert_eq!(
        config.recommendation_format,
        RecommendationFormat::NamedTitleList
    );
}

#[test]
#[serial]
fn test_overrides_from_environment() {
    clear_vars();
    env::set_var("HTTP_PORT", "8088");
    env::set_var("REDIS_URL", "redis://localhost:6379");
    env::set_var("SPOTIFY_SCOPES", "playlist-modify-public,user-read-private");
    env::set_var("OPENAI_CHAT_MODEL", "gpt-4o-mini");
    env::set_var("FRONTEND_URL", "https://playlists.example.com");
    env::set_var("RECOMMENDATION_FORMAT", "direct_uri");

    let config = ServerConfig::from_env().unwrap();
    clear_vars();

    assert_eq!(config.http_port, 8088);
    assert_eq!(
        config.session.redis_url.as_deref(),
        Some("redis://localhost:6379")
    );
    assert_eq!(
        config.spotify.scopes,
        vec!["playlist-modify-public", "user-read-private"]
    );
    assert_eq!(config.completion.chat_model, "gpt-4o-mini");
    assert_eq!(config.frontend_url, "https://playlists.example.com/");
    assert_eq!(
        config.recommendation_format,
        RecommendationFormat::DirectUriList
    );
    assert!(config.summary().contains("Sessions: Redis"));
}

#[test]
#[serial]
fn test_invalid_port_is_rejected() {
    clear_vars();
    env::set_var("HTTP_PORT", "not-a-port");

    let result = ServerConfig::from_env();
    clear_vars();

    assert!(result.is_err());
}

#[test]
#[serial]
fn test_production_requires_credentials() {
    clear_vars();
    env::set_var("ENVIRONMENT", "production");

    let result = ServerConfig::from_env();
    assert!(result.is_err());

    env::set_var("SPOTIFY_CLIENT_ID", "id");
    env::set_var("SPOTIFY_CLIENT_SECRET", "secret");
    env::set_var("OPENAI_API_KEY", "key");
    let config = ServerConfig::from_env().unwrap();
    clear_vars();

    assert!(config.environment.is_production());
    assert!(!config.summary().contains("secret"));
}
