// ABOUTME: Spotify sign-in routes: authorization redirect, callback, logout and current user
// ABOUTME: The callback verifies the OAuth state and stores identity and token in the session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! Authentication routes
//!
//! `/login` starts the authorization-code flow with a random `state` kept in
//! the session. `/callback` checks it, exchanges the code, resolves the Spotify
//! user and rotates the session id before storing the credentials.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::with_session_cookie;
use crate::errors::{AppError, AppResult};
use crate::logging::AppLogger;
use crate::oauth2_client::{generate_state, PkceParams};
use crate::server::ServerResources;
use crate::session::{cookies, ActiveSession};

/// Query parameters delivered to the OAuth callback
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization code
    pub code: Option<String>,
    /// State echoed back by the authorization server
    pub state: Option<String>,
    /// Error reported by the authorization server
    pub error: Option<String>,
}

/// Current session user
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    /// Spotify user id, when signed in
    pub user_id: Option<String>,
    /// Whether the session holds identity and token
    pub authenticated: bool,
}

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/login", get(Self::handle_login))
            .route("/callback", get(Self::handle_callback))
            .route("/logout", get(Self::handle_logout))
            .route("/user", get(Self::handle_current_user))
            .with_state(resources)
    }

    /// Redirect the browser to the Spotify consent page
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let mut session = ActiveSession::from_headers(resources.sessions.as_ref(), &headers).await?;

        let state = generate_state();
        let pkce = resources.oauth.config().use_pkce.then(PkceParams::generate);
        let authorization_url = resources
            .oauth
            .get_authorization_url(&state, pkce.as_ref())?;

        session.data.oauth_state = Some(state);
        session.data.pkce_verifier = pkce.map(|p| p.code_verifier);
        session.save(resources.sessions.as_ref()).await?;

        Ok(with_session_cookie(
            &resources,
            &session,
            Redirect::to(&authorization_url),
        ))
    }

    /// Complete the authorization-code flow
    async fn handle_callback(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(params): Query<CallbackParams>,
    ) -> AppResult<Response> {
        let mut session = ActiveSession::from_headers(resources.sessions.as_ref(), &headers).await?;

        if let Some(error) = params.error {
            AppLogger::log_security_event("oauth_denied", &error, None);
            return Err(AppError::auth_invalid(format!("Authorization failed: {error}")));
        }

        let expected_state = session.data.oauth_state.take();
        let state_matches = matches!(
            (&params.state, &expected_state),
            (Some(received), Some(expected)) if received == expected
        );
        if !state_matches {
            AppLogger::log_security_event(
                "oauth_state_mismatch",
                "Callback state does not match the session",
                None,
            );
            return Err(AppError::invalid_input("State mismatch"));
        }

        let code = params
            .code
            .filter(|code| !code.is_empty())
            .ok_or_else(|| AppError::missing_parameter("code"))?;
        let verifier = session.data.pkce_verifier.take();

        let token = resources
            .oauth
            .exchange_code(&code, verifier.as_deref())
            .await?;
        let user = resources.catalog.current_user(&token.access_token).await?;
        resources.database.upsert_user(&user.id).await?;

        AppLogger::log_oauth_event(&user.id, "authorization_complete", true);
        info!(
            "Signed in Spotify user {} ({})",
            user.id,
            user.display_name.as_deref().unwrap_or("no display name")
        );

        session.rotate(resources.sessions.as_ref()).await?;
        session.data.user_id = Some(user.id);
        session.data.access_token = Some(token.access_token);
        session.data.pending_tracks = None;
        session.save(resources.sessions.as_ref()).await?;

        let destination = format!("{}chat", resources.config.frontend_url);
        Ok(with_session_cookie(
            &resources,
            &session,
            Redirect::to(&destination),
        ))
    }

    /// Destroy the session and clear its cookie
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let session = ActiveSession::from_headers(resources.sessions.as_ref(), &headers).await?;
        if !session.is_new {
            resources.sessions.destroy(&session.id).await?;
            if let Some(user_id) = &session.data.user_id {
                AppLogger::log_oauth_event(user_id, "logout", true);
            }
        }

        let mut response = (StatusCode::OK, "Logout successful").into_response();
        cookies::clear_session_cookie(response.headers_mut(), resources.secure_cookies());
        Ok(response)
    }

    /// Report who the session belongs to
    async fn handle_current_user(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Json<CurrentUserResponse>> {
        let session = ActiveSession::from_headers(resources.sessions.as_ref(), &headers).await?;

        Ok(Json(CurrentUserResponse {
            authenticated: session.data.is_authenticated(),
            user_id: session.data.user_id,
        }))
    }
}
