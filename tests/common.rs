// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory storage, stub completion and catalog clients, and test server resources
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `playlist_chat`
//!
//! The stub collaborators record every call so tests can assert on call
//! counts and ordering without any network access.

use async_trait::async_trait;
use playlist_chat::{
    config::{
        CompletionConfig, CorsConfig, DatabaseConfig, Environment, ServerConfig, SessionConfig,
        SpotifyConfig,
    },
    conversation::{ConversationEngine, RecommendationFormat},
    database::{Database, SqliteTranscriptStore, TranscriptStore},
    errors::{AppError, AppResult},
    llm::{ChatMessage, CompletionClient, CompletionRequest},
    server::ServerResources,
    session::{InMemorySessionStore, SessionStore},
    spotify::{CreatedPlaylist, MusicCatalog, SpotifyUser, TrackUri},
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
pub async fn create_test_database() -> Database {
    init_test_logging();
    Database::new("sqlite::memory:").await.unwrap()
}

/// Configuration suitable for in-process tests
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        environment: Environment::Testing,
        database: DatabaseConfig {
            url: "sqlite::memory:".to_owned(),
        },
        session: SessionConfig {
            redis_url: None,
            ttl_secs: 3600,
            max_entries: 100,
            cleanup_interval_secs: 60,
        },
        spotify: SpotifyConfig {
            client_id: "test_client_id".to_owned(),
            client_secret: "test_client_secret".to_owned(),
            redirect_uri: "http://localhost:4000/callback".to_owned(),
            scopes: vec![
                "playlist-modify-public".to_owned(),
                "user-read-private".to_owned(),
            ],
            api_base_url: "http://127.0.0.1:9/v1".to_owned(),
            accounts_base_url: "http://127.0.0.1:9".to_owned(),
            use_pkce: false,
        },
        completion: CompletionConfig {
            api_key: Some("test_key".to_owned()),
            base_url: "http://127.0.0.1:9/v1".to_owned(),
            chat_model: "chat-model".to_owned(),
            naming_model: "naming-model".to_owned(),
        },
        cors: CorsConfig {
            allowed_origins: "http://localhost:3000".to_owned(),
        },
        frontend_url: "http://localhost:3000/".to_owned(),
        recommendation_format: RecommendationFormat::NamedTitleList,
    }
}

// ============================================================================
// Stub completion client
// ============================================================================

/// Completion client replaying queued replies
#[derive(Default)]
pub struct StubCompletion {
    replies: Mutex<VecDeque<AppResult<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubCompletion {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful reply
    pub fn reply(&self, content: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(content.to_owned()));
    }

    /// Queue a failure
    pub fn fail(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(AppError::upstream("OpenAI", message)));
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for StubCompletion {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn complete(&self, request: &CompletionRequest) -> AppResult<ChatMessage> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => Ok(ChatMessage::assistant(content)),
            Some(Err(e)) => Err(e),
            None => Err(AppError::upstream("OpenAI", "no reply queued")),
        }
    }
}

// ============================================================================
// Stub music catalog
// ============================================================================

/// One recorded catalog call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    Search(String),
    CreatePlaylist { user_id: String, name: String },
    AddTracks { playlist_id: String, tracks: Vec<TrackUri> },
    CurrentUser,
}

/// Catalog resolving titles from a fixed table
#[derive(Default)]
pub struct StubCatalog {
    titles: HashMap<String, TrackUri>,
    calls: Mutex<Vec<CatalogCall>>,
    fail_create: bool,
    fail_add: bool,
    fail_search: bool,
}

impl StubCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `title` to `uri`
    pub fn with_track(mut self, title: &str, uri: &str) -> Self {
        self.titles.insert(title.to_owned(), TrackUri::new(uri));
        self
    }

    pub const fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub const fn failing_add(mut self) -> Self {
        self.fail_add = true;
        self
    }

    pub const fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, call: CatalogCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MusicCatalog for StubCatalog {
    async fn search_track(&self, _access_token: &str, title: &str) -> AppResult<Option<TrackUri>> {
        self.record(CatalogCall::Search(title.to_owned()));
        if self.fail_search {
            return Err(AppError::upstream("Spotify", "search failed"));
        }
        Ok(self.titles.get(title).cloned())
    }

    async fn create_playlist(
        &self,
        _access_token: &str,
        user_id: &str,
        name: &str,
    ) -> AppResult<CreatedPlaylist> {
        self.record(CatalogCall::CreatePlaylist {
            user_id: user_id.to_owned(),
            name: name.to_owned(),
        });
        if self.fail_create {
            return Err(AppError::upstream("Spotify", "playlist creation failed"));
        }
        Ok(CreatedPlaylist {
            id: "playlist_1".to_owned(),
            name: name.to_owned(),
            description: Some("Created with playlist-chat app".to_owned()),
            public: Some(true),
        })
    }

    async fn add_tracks(
        &self,
        _access_token: &str,
        playlist_id: &str,
        tracks: &[TrackUri],
    ) -> AppResult<()> {
        self.record(CatalogCall::AddTracks {
            playlist_id: playlist_id.to_owned(),
            tracks: tracks.to_vec(),
        });
        if self.fail_add {
            return Err(AppError::upstream("Spotify", "adding tracks failed"));
        }
        Ok(())
    }

    async fn current_user(&self, _access_token: &str) -> AppResult<SpotifyUser> {
        self.record(CatalogCall::CurrentUser);
        Ok(SpotifyUser {
            id: "spotify_user".to_owned(),
            display_name: Some("Test Listener".to_owned()),
        })
    }
}

// ============================================================================
// Assembled fixtures
// ============================================================================

/// Engine wired to stubs and an in-memory transcript store
pub struct EngineFixture {
    pub engine: ConversationEngine,
    pub completion: Arc<StubCompletion>,
    pub catalog: Arc<StubCatalog>,
    pub transcripts: Arc<dyn TranscriptStore>,
    pub database: Database,
}

/// Build an engine for the given recommendation format
pub async fn engine_fixture(catalog: StubCatalog, format: RecommendationFormat) -> EngineFixture {
    let database = create_test_database().await;
    let completion = StubCompletion::new();
    let catalog = Arc::new(catalog);
    let transcripts: Arc<dyn TranscriptStore> =
        Arc::new(SqliteTranscriptStore::new(database.clone()));

    let engine = ConversationEngine::new(
        Arc::clone(&completion) as Arc<dyn CompletionClient>,
        Arc::clone(&catalog) as Arc<dyn MusicCatalog>,
        Arc::clone(&transcripts),
        format,
    )
    .with_models("chat-model", "naming-model")
    .with_playlist_audit(database.clone());

    EngineFixture {
        engine,
        completion,
        catalog,
        transcripts,
        database,
    }
}

/// Server resources wired to stubs, with in-memory sessions
pub struct ServerFixture {
    pub resources: Arc<ServerResources>,
    pub completion: Arc<StubCompletion>,
    pub catalog: Arc<StubCatalog>,
    pub sessions: Arc<dyn SessionStore>,
}

pub async fn server_fixture(catalog: StubCatalog) -> ServerFixture {
    let database = create_test_database().await;
    let completion = StubCompletion::new();
    let catalog = Arc::new(catalog);
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new(
        100,
        Duration::from_secs(3600),
        None,
    ));

    let resources = ServerResources::new(
        test_config(),
        database,
        Arc::clone(&sessions),
        Arc::clone(&completion) as Arc<dyn CompletionClient>,
        Arc::clone(&catalog) as Arc<dyn MusicCatalog>,
    );

    ServerFixture {
        resources: Arc::new(resources),
        completion,
        catalog,
        sessions,
    }
}
