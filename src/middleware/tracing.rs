// ABOUTME: Request tracing layer with per-request correlation IDs
// ABOUTME: Reuses an incoming x-request-id header or generates one, and records it on the span
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use axum::http::Request;
use tracing::Span;
use uuid::Uuid;

/// Header carrying the request correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Read the request ID from headers, or generate a new one
#[must_use]
pub fn request_id_from<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(
            || format!("req_{}", Uuid::new_v4().simple()),
            ToOwned::to_owned,
        )
}

/// Create the span for one HTTP request
pub fn create_request_span<B>(request: &Request<B>) -> Span {
    tracing::info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri().path(),
        request_id = %request_id_from(request),
    )
}
