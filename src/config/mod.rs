// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: Exposes environment-driven server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! Configuration module

/// Environment and server configuration
pub mod environment;

pub use environment::{
    CompletionConfig, CorsConfig, DatabaseConfig, Environment, ServerConfig, SessionConfig,
    SpotifyConfig,
};
