// ABOUTME: Utility module for shared helpers used across the server
// ABOUTME: Currently hosts outbound HTTP client construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

/// Outbound HTTP client presets
pub mod http_client;
