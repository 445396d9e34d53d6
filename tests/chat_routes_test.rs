// ABOUTME: HTTP tests for the chat and transcript reset routes
// ABOUTME: Drives the full router in-process with stub collaborators and in-memory sessions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;
mod helpers;

use common::{server_fixture, CatalogCall, ServerFixture, StubCatalog};
use helpers::axum_test::AxumTestRequest;
use playlist_chat::constants::prompts::{GREETING, SAVED_CONFIRMATION_PREFIX};
use playlist_chat::constants::session::COOKIE_NAME;
use playlist_chat::server::build_router;
use playlist_chat::session::SessionData;
use playlist_chat::spotify::TrackUri;
use serde_json::{json, Value};
use std::sync::Arc;

const SESSION_ID: &str = "test_session";

async fn signed_in_fixture(catalog: StubCatalog) -> ServerFixture {
    let fixture = server_fixture(catalog).await;
    let data = SessionData {
        user_id: Some("listener_1".to_owned()),
        access_token: Some("access_token_1".to_owned()),
        ..SessionData::default()
    };
    fixture.sessions.save(SESSION_ID, &data).await.unwrap();
    fixture
}

async fn post_chat(fixture: &ServerFixture, message: &str) -> (u16, Value) {
    let response = AxumTestRequest::post("/chat")
        .cookie(COOKIE_NAME, SESSION_ID)
        .json(&json!({ "message": message }))
        .send(build_router(Arc::clone(&fixture.resources)))
        .await;
    let status = response.status();
    (status, response.json())
}

#[tokio::test]
async fn test_chat_first_turn_returns_greeting() {
    let fixture = signed_in_fixture(StubCatalog::new()).await;

    let (status, body) = post_chat(&fixture, "hello").await;

    assert_eq!(status, 200);
    assert_eq!(body["message"], GREETING);
    assert_eq!(fixture.completion.call_count(), 0);
}

#[tokio::test]
async fn test_chat_without_message_is_bad_request() {
    let fixture = signed_in_fixture(StubCatalog::new()).await;

    let response = AxumTestRequest::post("/chat")
        .cookie(COOKIE_NAME, SESSION_ID)
        .json(&json!({}))
        .send(build_router(Arc::clone(&fixture.resources)))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "MISSING_PARAMETER");
    assert_eq!(body["error"]["message"], "Missing message");
}

#[tokio::test]
async fn test_chat_with_malformed_body_is_missing_message() {
    let fixture = signed_in_fixture(StubCatalog::new()).await;

    let response = AxumTestRequest::post("/chat")
        .cookie(COOKIE_NAME, SESSION_ID)
        .raw_body("application/json", "{not json")
        .send(build_router(Arc::clone(&fixture.resources)))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Missing message");
}

#[tokio::test]
async fn test_chat_without_session_is_missing_user() {
    let fixture = server_fixture(StubCatalog::new()).await;

    let response = AxumTestRequest::post("/chat")
        .json(&json!({ "message": "hello" }))
        .send(build_router(Arc::clone(&fixture.resources)))
        .await;

    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Missing userId");
    assert_eq!(fixture.completion.call_count(), 0);
}

#[tokio::test]
async fn test_recommendation_is_kept_in_session_until_confirmed() {
    let catalog = StubCatalog::new()
        .with_track("Holocene", "spotify:track:holocene")
        .with_track("Skinny Love", "spotify:track:skinnylove");
    let fixture = signed_in_fixture(catalog).await;

    post_chat(&fixture, "hello").await;
    fixture
        .completion
        .reply("Here are your tracks:\n1. Holocene\n2. Skinny Love");
    let (status, _) = post_chat(&fixture, "quiet folk please").await;
    assert_eq!(status, 200);

    let session = fixture.sessions.load(SESSION_ID).await.unwrap().unwrap();
    assert_eq!(
        session.pending_tracks,
        Some(vec![
            TrackUri::new("spotify:track:holocene"),
            TrackUri::new("spotify:track:skinnylove"),
        ])
    );

    fixture.completion.reply("Quiet Woods");
    let (status, body) = post_chat(&fixture, "yes").await;

    assert_eq!(status, 200);
    assert_eq!(
        body["message"],
        format!("{SAVED_CONFIRMATION_PREFIX}Quiet Woods")
    );
    assert!(fixture.catalog.calls().contains(&CatalogCall::CreatePlaylist {
        user_id: "listener_1".to_owned(),
        name: "Quiet Woods".to_owned(),
    }));

    let session = fixture.sessions.load(SESSION_ID).await.unwrap().unwrap();
    assert_eq!(session.pending_tracks, None);
}

#[tokio::test]
async fn test_upstream_failure_keeps_pending_tracks() {
    let fixture = server_fixture(StubCatalog::new().failing_create()).await;
    let data = SessionData {
        user_id: Some("listener_1".to_owned()),
        access_token: Some("access_token_1".to_owned()),
        pending_tracks: Some(vec![TrackUri::new("spotify:track:abc")]),
        ..SessionData::default()
    };
    fixture.sessions.save(SESSION_ID, &data).await.unwrap();

    fixture.completion.reply("Night Drive");
    let (status, body) = post_chat(&fixture, "yes").await;

    assert_eq!(status, 502);
    assert_eq!(body["error"]["code"], "UPSTREAM_SERVICE_ERROR");
    let session = fixture.sessions.load(SESSION_ID).await.unwrap().unwrap();
    assert_eq!(
        session.pending_tracks,
        Some(vec![TrackUri::new("spotify:track:abc")])
    );
}

#[tokio::test]
async fn test_concurrent_confirmations_save_one_playlist() {
    let fixture = server_fixture(StubCatalog::new()).await;
    let data = SessionData {
        user_id: Some("listener_1".to_owned()),
        access_token: Some("access_token_1".to_owned()),
        pending_tracks: Some(vec![TrackUri::new("spotify:track:abc")]),
        ..SessionData::default()
    };
    fixture.sessions.save(SESSION_ID, &data).await.unwrap();
    fixture.completion.reply("Night Drive");
    fixture.completion.reply("Want another playlist?");

    let ((first, _), (second, _)) =
        tokio::join!(post_chat(&fixture, "yes"), post_chat(&fixture, "yes"));

    assert_eq!(first, 200);
    assert_eq!(second, 200);
    let creates = fixture
        .catalog
        .calls()
        .into_iter()
        .filter(|call| matches!(call, CatalogCall::CreatePlaylist { .. }))
        .count();
    assert_eq!(creates, 1);
    let session = fixture.sessions.load(SESSION_ID).await.unwrap().unwrap();
    assert_eq!(session.pending_tracks, None);
}

#[tokio::test]
async fn test_clean_resets_conversation() {
    let fixture = signed_in_fixture(StubCatalog::new()).await;
    post_chat(&fixture, "hello").await;
    assert!(fixture
        .resources
        .transcripts
        .read("listener_1")
        .await
        .unwrap()
        .is_some());

    let response = AxumTestRequest::post("/clean")
        .cookie(COOKIE_NAME, SESSION_ID)
        .send(build_router(Arc::clone(&fixture.resources)))
        .await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["message"], "Conversation cleared successfully");
    assert_eq!(
        fixture
            .resources
            .transcripts
            .read("listener_1")
            .await
            .unwrap(),
        None
    );

    // The next turn starts over with the greeting
    let (_, body) = post_chat(&fixture, "hi again").await;
    assert_eq!(body["message"], GREETING);
}

#[tokio::test]
async fn test_clean_without_user_is_bad_request() {
    let fixture = server_fixture(StubCatalog::new()).await;

    let response = AxumTestRequest::get("/clean")
        .send(build_router(Arc::clone(&fixture.resources)))
        .await;

    assert_eq!(response.status(), 400);
}
