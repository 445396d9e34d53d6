// ABOUTME: Main library entry point for the playlist chat server
// ABOUTME: Conversational playlist building on top of a chat completion API and Spotify
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

#![deny(unsafe_code)]

//! # Playlist Chat Server
//!
//! An HTTP backend that interviews a signed-in Spotify user through a chat
//! completion model, extracts the recommended tracks from the model's reply and,
//! once the user confirms, creates a named playlist on the user's account.
//!
//! ## Architecture
//!
//! - **Conversation**: the per-turn state machine and track extraction
//! - **LLM**: chat completion client behind the `CompletionClient` trait
//! - **Spotify**: music catalog client behind the `MusicCatalog` trait
//! - **Database**: `SQLite` persistence of users, transcripts and created playlists
//! - **Session**: cookie sessions in memory or Redis
//! - **Routes**: sign-in, chat and health endpoints
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use playlist_chat::config::ServerConfig;
//! use playlist_chat::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Playlist chat configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Configuration loaded from the environment
pub mod config;

/// Application constants and prompt texts
pub mod constants;

/// Conversation engine, transcript codec and track extraction
pub mod conversation;

/// `SQLite` persistence for users, transcripts and playlists
pub mod database;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// Chat completion clients
pub mod llm;

/// Structured logging setup
pub mod logging;

/// HTTP middleware for CORS and request tracing
pub mod middleware;

/// `OAuth2` authorization-code client for Spotify sign-in
pub mod oauth2_client;

/// HTTP route handlers
pub mod routes;

/// Server resources, router assembly and serve loop
pub mod server;

/// Cookie sessions and their storage backends
pub mod session;

/// Spotify Web API client
pub mod spotify;

/// Shared utilities
pub mod utils;
