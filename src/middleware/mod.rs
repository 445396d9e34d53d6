// ABOUTME: HTTP middleware for CORS and request tracing
// ABOUTME: Layers applied around every route by the server router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

/// CORS layer built from configured origins
pub mod cors;
/// Request span with a request id
pub mod tracing;

// CORS configuration
pub use self::cors::setup_cors;

// Request tracing
pub use self::tracing::{create_request_span, request_id_from, REQUEST_ID_HEADER};
