// ABOUTME: Shared HTTP client constructors with timeout presets for OAuth and Web API calls
// ABOUTME: Centralizes reqwest client creation so every outbound call carries timeouts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Create an HTTP client with the given request and connect timeouts
///
/// Falls back to a default client if the builder fails.
#[must_use]
pub fn create_client_with_timeout(timeout_secs: u64, connect_timeout_secs: u64) -> Client {
    ClientBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(connect_timeout_secs))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Client for OAuth token exchanges (15s request, 5s connect)
#[must_use]
pub fn oauth_client() -> Client {
    create_client_with_timeout(15, 5)
}

/// Client for catalog API calls (30s request, 10s connect)
#[must_use]
pub fn api_client() -> Client {
    create_client_with_timeout(30, 10)
}
