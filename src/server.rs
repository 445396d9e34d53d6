// ABOUTME: Shared server resources, router assembly and the HTTP serve loop
// ABOUTME: Wires configuration, storage, collaborators and the conversation engine together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! # Server Assembly
//!
//! [`ServerResources`] is built once at startup and shared with every route
//! through `Arc`. Tests build it with stub collaborators through
//! [`ServerResources::new`].

use axum::body::Body;
use axum::http::StatusCode;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::constants::server::REQUEST_TIMEOUT_SECS;
use crate::conversation::{ConversationEngine, TurnLocks};
use crate::database::{Database, SqliteTranscriptStore, TranscriptStore};
use crate::errors::AppResult;
use crate::llm::{CompletionClient, OpenAiClient, OpenAiConfig};
use crate::middleware::{create_request_span, setup_cors};
use crate::oauth2_client::{OAuth2Client, OAuth2Config};
use crate::routes::{AuthRoutes, ChatRoutes, HealthRoutes};
use crate::session::{create_session_store, SessionStore};
use crate::spotify::{MusicCatalog, SpotifyClient};

/// Resources shared by all route handlers
pub struct ServerResources {
    /// Server configuration
    pub config: Arc<ServerConfig>,
    /// SQLite database
    pub database: Database,
    /// Session backend
    pub sessions: Arc<dyn SessionStore>,
    /// Transcript persistence
    pub transcripts: Arc<dyn TranscriptStore>,
    /// Music catalog client
    pub catalog: Arc<dyn MusicCatalog>,
    /// Turn processor
    pub engine: ConversationEngine,
    /// Spotify authorization client
    pub oauth: OAuth2Client,
    /// Per-session locks covering the pending track list across a turn
    pub session_locks: TurnLocks,
}

impl ServerResources {
    /// Assemble resources around the given collaborators
    #[must_use]
    pub fn new(
        config: ServerConfig,
        database: Database,
        sessions: Arc<dyn SessionStore>,
        completion: Arc<dyn CompletionClient>,
        catalog: Arc<dyn MusicCatalog>,
    ) -> Self {
        let transcripts: Arc<dyn TranscriptStore> =
            Arc::new(SqliteTranscriptStore::new(database.clone()));

        let engine = ConversationEngine::new(
            completion,
            Arc::clone(&catalog),
            Arc::clone(&transcripts),
            config.recommendation_format,
        )
        .with_models(
            config.completion.chat_model.as_str(),
            config.completion.naming_model.as_str(),
        )
        .with_playlist_audit(database.clone());

        let oauth = OAuth2Client::new(OAuth2Config::spotify(&config.spotify));

        Self {
            config: Arc::new(config),
            database,
            sessions,
            transcripts,
            catalog,
            engine,
            oauth,
            session_locks: TurnLocks::new(),
        }
    }

    /// Build production resources from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database, session store or HTTP clients cannot be initialized
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database.url).await?;
        let sessions = create_session_store(&config.session).await?;
        let completion: Arc<dyn CompletionClient> =
            Arc::new(OpenAiClient::new(OpenAiConfig::from(&config.completion))?);
        let catalog: Arc<dyn MusicCatalog> =
            Arc::new(SpotifyClient::new(config.spotify.api_base_url.as_str()));

        info!(
            "Server resources ready (sessions: {}, completion: {})",
            sessions.backend_name(),
            completion.name()
        );

        Ok(Self::new(config, database, sessions, completion, catalog))
    }

    /// Whether cookies carry the `Secure` attribute
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.config.environment.is_production()
    }
}

/// Build the application router
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config.cors);

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(AuthRoutes::routes(Arc::clone(&resources)))
        .merge(ChatRoutes::routes(resources))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
        .layer(TraceLayer::new_for_http().make_span_with(create_request_span::<Body>))
        .layer(cors)
}

/// Serve the application until Ctrl+C
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails
pub async fn run_server(resources: Arc<ServerResources>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], resources.config.http_port));
    let router = build_router(resources);

    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Ctrl+C received, shutting down");
}
