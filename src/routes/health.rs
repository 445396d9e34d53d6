// ABOUTME: Landing, health and readiness route handlers
// ABOUTME: Readiness probes the database and the session store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! Health check routes for service monitoring

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tracing::warn;

use crate::constants::service_names::PLAYLIST_CHAT_SERVER;
use crate::server::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/", get(Self::index_handler))
            .route("/health", get(Self::health_handler))
            .route("/ready", get(Self::ready_handler))
            .with_state(resources)
    }

    async fn index_handler() -> &'static str {
        "Playlist chat server is running"
    }

    async fn health_handler() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "healthy",
            "service": PLAYLIST_CHAT_SERVER,
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    async fn ready_handler(State(resources): State<Arc<ServerResources>>) -> impl IntoResponse {
        let database = match resources.database.health_check().await {
            Ok(()) => "ok",
            Err(e) => {
                warn!("Readiness: database check failed: {e}");
                "unavailable"
            }
        };
        let sessions = match resources.sessions.health_check().await {
            Ok(()) => "ok",
            Err(e) => {
                warn!("Readiness: session store check failed: {e}");
                "unavailable"
            }
        };

        let ready = database == "ok" && sessions == "ok";
        let status = if ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        (
            status,
            Json(serde_json::json!({
                "status": if ready { "ready" } else { "not_ready" },
                "checks": {
                    "database": database,
                    "sessions": sessions,
                    "session_backend": resources.sessions.backend_name(),
                },
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
    }
}
