// ABOUTME: Route module organization for the playlist chat HTTP endpoints
// ABOUTME: Groups health, Spotify sign-in and chat routes, each built from shared server resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! Route module for the playlist chat server
//!
//! Each domain module contains route definitions and thin handlers that
//! delegate to the session store, the OAuth client and the conversation engine.

/// Spotify sign-in, logout and current-user routes
pub mod auth;
/// Chat turn and transcript reset routes
pub mod chat;
/// Landing, health and readiness routes
pub mod health;

pub use auth::AuthRoutes;
pub use chat::ChatRoutes;
pub use health::HealthRoutes;

use axum::response::{IntoResponse, Response};

use crate::server::ServerResources;
use crate::session::{cookies, ActiveSession};

/// Attach the session cookie to a response when the session is new
pub(crate) fn with_session_cookie(
    resources: &ServerResources,
    session: &ActiveSession,
    response: impl IntoResponse,
) -> Response {
    let mut response = response.into_response();
    if session.is_new {
        cookies::set_session_cookie(
            response.headers_mut(),
            &session.id,
            resources.config.session.ttl_secs,
            resources.secure_cookies(),
        );
    }
    response
}
