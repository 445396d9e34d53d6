// ABOUTME: OAuth2 client module for Spotify account authorization
// ABOUTME: Re-exports the authorization-code client, token and PKCE types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

/// Authorization-code client implementation
pub mod client;

pub use client::{generate_state, OAuth2Client, OAuth2Config, OAuth2Token, PkceParams};
