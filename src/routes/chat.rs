// ABOUTME: Chat routes: one conversation turn per request and a transcript reset
// ABOUTME: Identity, token and pending tracks come from the session; replies are JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! Chat routes
//!
//! `POST /chat` runs one turn of the conversation engine with the identity
//! stored in the session. The pending track list lives in the session between
//! turns and is written back after every successful turn. Requests carrying
//! the same session cookie are handled one at a time, from session load to
//! session save.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::info;

use super::with_session_cookie;
use crate::constants::session::COOKIE_NAME;
use crate::conversation::TurnRequest;
use crate::errors::{AppError, AppResult};
use crate::server::ServerResources;
use crate::session::cookies::get_cookie_value;
use crate::session::ActiveSession;

/// Body of a chat turn request
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    /// User utterance
    pub message: Option<String>,
}

/// Reply to a chat turn
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Assistant text to show the user
    pub message: String,
}

/// Chat routes implementation
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/chat", post(Self::handle_chat))
            .route("/clean", post(Self::handle_clean).get(Self::handle_clean))
            .with_state(resources)
    }

    /// Hold the lock of the session named by the request cookie
    ///
    /// Requests without a cookie get a fresh session nobody else can share.
    async fn lock_session(
        resources: &ServerResources,
        headers: &HeaderMap,
    ) -> Option<OwnedMutexGuard<()>> {
        let session_id = get_cookie_value(headers, COOKIE_NAME)?;
        Some(resources.session_locks.acquire(&session_id).await)
    }

    /// Process one conversation turn
    async fn handle_chat(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Option<Json<ChatRequest>>,
    ) -> AppResult<Response> {
        let _session_guard = Self::lock_session(&resources, &headers).await;
        let mut session = ActiveSession::from_headers(resources.sessions.as_ref(), &headers).await?;
        let body = body.map(|Json(body)| body).unwrap_or_default();

        let request = TurnRequest {
            user_id: session.data.user_id.clone(),
            access_token: session.data.access_token.clone(),
            message: body.message,
            pending_tracks: session.data.pending_tracks.take(),
        };

        let outcome = resources.engine.process_turn(request).await?;

        session.data.pending_tracks = outcome.updated_pending_tracks;
        session.save(resources.sessions.as_ref()).await?;

        Ok(with_session_cookie(
            &resources,
            &session,
            Json(ChatResponse {
                message: outcome.reply_text,
            }),
        ))
    }

    /// Drop the stored transcript and any pending tracks
    async fn handle_clean(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let _session_guard = Self::lock_session(&resources, &headers).await;
        let mut session = ActiveSession::from_headers(resources.sessions.as_ref(), &headers).await?;
        let user_id = session
            .data
            .user_id
            .clone()
            .ok_or_else(|| AppError::missing_parameter("userId"))?;

        resources.transcripts.clear(&user_id).await?;
        session.data.pending_tracks = None;
        session.save(resources.sessions.as_ref()).await?;
        info!("Cleared conversation for user {user_id}");

        Ok(with_session_cookie(
            &resources,
            &session,
            Json(ChatResponse {
                message: "Conversation cleared successfully".to_owned(),
            }),
        ))
    }
}
