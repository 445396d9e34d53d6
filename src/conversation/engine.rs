// ABOUTME: Turn processing for the playlist interview: greeting, model turns and playlist saving
// ABOUTME: Loads and persists the transcript per user and serializes turns per identity
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::extraction::extract_tracks;
use super::locks::TurnLocks;
use super::transcript::initial_transcript;
use super::{RecommendationFormat, TurnOutcome, TurnParameters, TurnRequest};
use crate::constants::markers::CONFIRMATION_TOKEN;
use crate::constants::prompts::{GREETING, PLAYLIST_NAME_INSTRUCTION, SAVED_CONFIRMATION_PREFIX};
use crate::constants::service_names;
use crate::database::{Database, TranscriptStore};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::{ChatMessage, CompletionClient, CompletionRequest};
use crate::spotify::{CreatedPlaylist, MusicCatalog, TrackUri};

/// Runs chat turns against the completion client and the music catalog
pub struct ConversationEngine {
    completion: Arc<dyn CompletionClient>,
    catalog: Arc<dyn MusicCatalog>,
    transcripts: Arc<dyn TranscriptStore>,
    playlist_audit: Option<Database>,
    locks: TurnLocks,
    format: RecommendationFormat,
    chat_model: Option<String>,
    naming_model: Option<String>,
}

impl ConversationEngine {
    /// Create an engine that instructs the model to use `format`
    #[must_use]
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        catalog: Arc<dyn MusicCatalog>,
        transcripts: Arc<dyn TranscriptStore>,
        format: RecommendationFormat,
    ) -> Self {
        Self {
            completion,
            catalog,
            transcripts,
            playlist_audit: None,
            locks: TurnLocks::new(),
            format,
            chat_model: None,
            naming_model: None,
        }
    }

    /// Use specific models for interview turns and playlist naming
    #[must_use]
    pub fn with_models(
        mut self,
        chat_model: impl Into<String>,
        naming_model: impl Into<String>,
    ) -> Self {
        self.chat_model = Some(chat_model.into());
        self.naming_model = Some(naming_model.into());
        self
    }

    /// Record created playlists in the database
    #[must_use]
    pub fn with_playlist_audit(mut self, database: Database) -> Self {
        self.playlist_audit = Some(database);
        self
    }

    /// Process one chat turn
    ///
    /// Turns for the same user run one at a time. The transcript is written
    /// only when the whole turn succeeds.
    ///
    /// # Errors
    ///
    /// - `MissingParameter` naming the absent field, before any collaborator call
    /// - `UpstreamService` when the completion client or the catalog fails
    /// - `DatabaseError` when the transcript cannot be read or written
    #[instrument(skip_all, fields(user_id = tracing::field::Empty))]
    pub async fn process_turn(&self, request: TurnRequest) -> AppResult<TurnOutcome> {
        let params = request.parameters()?;
        tracing::Span::current().record("user_id", params.user_id);

        let _turn_guard = self.locks.acquire(params.user_id).await;

        let (mut transcript, fresh) = self.load_transcript(params.user_id).await?;
        transcript.push(ChatMessage::user(params.message));

        let pending = request
            .pending_tracks
            .as_deref()
            .filter(|tracks| !tracks.is_empty());

        if let Some(pending) = pending.filter(|_| is_confirmation(params.message)) {
            return self.save_playlist(params, transcript, pending).await;
        }

        if fresh {
            debug!("Starting a new interview");
            return self
                .finish_turn(
                    params.user_id,
                    transcript,
                    GREETING.to_owned(),
                    request.pending_tracks.clone(),
                )
                .await;
        }

        self.interview_turn(params, transcript, request.pending_tracks.clone())
            .await
    }

    /// Read the stored transcript, or start a new one
    ///
    /// Returns whether the transcript was freshly initialized.
    async fn load_transcript(&self, user_id: &str) -> AppResult<(Vec<ChatMessage>, bool)> {
        match self.transcripts.read(user_id).await {
            Ok(Some(transcript)) if !transcript.is_empty() => Ok((transcript, false)),
            Ok(_) => Ok((initial_transcript(self.format), true)),
            Err(e) if e.code == ErrorCode::Deserialization => {
                warn!(
                    user_id = %user_id,
                    error = %e.message,
                    "Stored transcript is unreadable, restarting the interview"
                );
                Ok((initial_transcript(self.format), true))
            }
            Err(e) => Err(e),
        }
    }

    /// Send the transcript to the model and look for a finished recommendation
    async fn interview_turn(
        &self,
        params: TurnParameters<'_>,
        mut transcript: Vec<ChatMessage>,
        pending_tracks: Option<Vec<TrackUri>>,
    ) -> AppResult<TurnOutcome> {
        let mut request = CompletionRequest::new(transcript.clone());
        if let Some(model) = &self.chat_model {
            request = request.with_model(model);
        }

        let reply = self
            .completion
            .complete(&request)
            .await
            .map_err(as_upstream(service_names::COMPLETION_API))?;
        transcript.push(ChatMessage::assistant(reply.content.as_str()));

        let extraction = extract_tracks(&reply.content, self.catalog.as_ref(), params.access_token)
            .await
            .map_err(as_upstream(service_names::SPOTIFY))?;

        match extraction {
            Some(extraction) => {
                info!(
                    format = %extraction.format,
                    tracks = extraction.tracks.len(),
                    "Recommendation ready for confirmation"
                );
                self.finish_turn(
                    params.user_id,
                    transcript,
                    extraction.display_text,
                    Some(extraction.tracks),
                )
                .await
            }
            None => {
                self.finish_turn(params.user_id, transcript, reply.content, pending_tracks)
                    .await
            }
        }
    }

    /// Name, create and fill the playlist the user just confirmed
    async fn save_playlist(
        &self,
        params: TurnParameters<'_>,
        mut transcript: Vec<ChatMessage>,
        pending: &[TrackUri],
    ) -> AppResult<TurnOutcome> {
        let name = self.generate_playlist_name(&transcript).await?;

        let playlist = self
            .catalog
            .create_playlist(params.access_token, params.user_id, &name)
            .await
            .map_err(as_upstream(service_names::SPOTIFY))?;

        // A failure here leaves the created playlist empty on the catalog side
        self.catalog
            .add_tracks(params.access_token, &playlist.id, pending)
            .await
            .map_err(as_upstream(service_names::SPOTIFY))?;

        info!(
            playlist_id = %playlist.id,
            tracks = pending.len(),
            "Saved playlist to the user's account"
        );
        self.record_playlist(params.user_id, &playlist).await;

        let reply = format!("{SAVED_CONFIRMATION_PREFIX}{name}");
        transcript.push(ChatMessage::assistant(reply.as_str()));

        self.finish_turn(params.user_id, transcript, reply, None).await
    }

    /// Ask the model for a short playlist name based on the conversation
    async fn generate_playlist_name(&self, transcript: &[ChatMessage]) -> AppResult<String> {
        let mut messages = transcript.to_vec();
        messages.push(ChatMessage::system(PLAYLIST_NAME_INSTRUCTION));

        let mut request = CompletionRequest::new(messages);
        if let Some(model) = &self.naming_model {
            request = request.with_model(model);
        }

        let reply = self
            .completion
            .complete(&request)
            .await
            .map_err(as_upstream(service_names::COMPLETION_API))?;

        let name = normalize_playlist_name(&reply.content);
        if name.is_empty() {
            return Err(AppError::upstream(
                service_names::COMPLETION_API,
                "returned an empty playlist name",
            ));
        }
        Ok(name)
    }

    async fn record_playlist(&self, user_id: &str, playlist: &CreatedPlaylist) {
        let Some(database) = &self.playlist_audit else {
            return;
        };
        if let Err(e) = database.record_playlist(user_id, playlist).await {
            warn!(playlist_id = %playlist.id, "Failed to record playlist: {e}");
        }
    }

    /// Persist the transcript and build the outcome
    async fn finish_turn(
        &self,
        user_id: &str,
        transcript: Vec<ChatMessage>,
        reply_text: String,
        updated_pending_tracks: Option<Vec<TrackUri>>,
    ) -> AppResult<TurnOutcome> {
        self.transcripts.write(user_id, &transcript).await?;

        Ok(TurnOutcome {
            reply_text,
            updated_pending_tracks,
            transcript_to_persist: transcript,
        })
    }
}

/// Whether a message confirms saving the pending playlist
#[must_use]
pub fn is_confirmation(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case(CONFIRMATION_TOKEN)
}

/// Trim a model-suggested playlist name and drop surrounding quotes
#[must_use]
pub fn normalize_playlist_name(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '\u{201C}' | '\u{201D}'))
        .trim()
        .to_owned()
}

/// Report collaborator failures as upstream errors
fn as_upstream(service: &'static str) -> impl Fn(AppError) -> AppError {
    move |error| {
        if error.code == ErrorCode::UpstreamService {
            error
        } else {
            AppError::upstream(service, error.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_confirmation() {
        assert!(is_confirmation("yes"));
        assert!(is_confirmation("  YES "));
        assert!(is_confirmation("Yes\n"));
        assert!(!is_confirmation("yes please"));
        assert!(!is_confirmation("no"));
    }

    #[test]
    fn test_normalize_playlist_name() {
        assert_eq!(normalize_playlist_name("  \"Sunset Drive\"\n"), "Sunset Drive");
        assert_eq!(normalize_playlist_name("\u{201C}Night Owl\u{201D}"), "Night Owl");
        assert_eq!(normalize_playlist_name("Rock'n Roll"), "Rock'n Roll");
        assert_eq!(normalize_playlist_name("  "), "");
    }

    #[test]
    fn test_as_upstream_keeps_upstream_errors() {
        let original = AppError::upstream("Spotify", "rate limited");
        let mapped = as_upstream(service_names::SPOTIFY)(original);
        assert_eq!(mapped.message, "Spotify: rate limited");

        let mapped = as_upstream(service_names::COMPLETION_API)(AppError::internal("boom"));
        assert_eq!(mapped.code, ErrorCode::UpstreamService);
        assert_eq!(mapped.message, "OpenAI: boom");
    }
}
