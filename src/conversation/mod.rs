// ABOUTME: Conversation engine module running the playlist interview turn by turn
// ABOUTME: Defines turn inputs/outputs and the recommendation output conventions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! # Conversation Engine
//!
//! A turn takes the user's message plus the session's identity, access token
//! and pending track list, and yields one assistant reply together with the
//! updated pending list. The engine decides between three paths:
//!
//! - **Greeting**: a fresh transcript answers with the fixed opening question.
//! - **Confirmation**: the user replied `yes` while tracks are pending, so the
//!   playlist is named, created and populated.
//! - **Interview**: the transcript goes to the completion client and the reply
//!   is scanned for a finished recommendation.

mod engine;
/// Recognition of finished recommendations inside model replies
pub mod extraction;
mod locks;
/// Transcript initialization and per-record (de)serialization
pub mod transcript;

pub use engine::ConversationEngine;
pub use extraction::{detect_format, extract_tracks, Extraction};
pub use locks::TurnLocks;
pub use transcript::{deserialize_transcript, initial_transcript, serialize_transcript};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{AppError, AppResult};
use crate::llm::ChatMessage;
use crate::spotify::TrackUri;

/// Output convention the model is instructed to use for recommendations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationFormat {
    /// Catalog-native `spotify:track:` identifiers embedded in the reply
    DirectUriList,
    /// Song titles listed after the named-list marker phrase
    #[default]
    NamedTitleList,
}

impl RecommendationFormat {
    /// Parse a configuration value, falling back to [`Self::NamedTitleList`]
    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "direct_uri" | "direct-uri" | "uri" | "uris" => Self::DirectUriList,
            _ => Self::NamedTitleList,
        }
    }

    /// Configuration value for this format
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DirectUriList => "direct_uri",
            Self::NamedTitleList => "named_list",
        }
    }
}

impl fmt::Display for RecommendationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of one chat turn, taken from the request body and the session
#[derive(Debug, Clone, Default)]
pub struct TurnRequest {
    /// Authenticated catalog user identity
    pub user_id: Option<String>,
    /// Catalog access token
    pub access_token: Option<String>,
    /// Message typed by the user
    pub message: Option<String>,
    /// Tracks awaiting confirmation from an earlier turn
    pub pending_tracks: Option<Vec<TrackUri>>,
}

/// Validated view of a [`TurnRequest`]
#[derive(Debug, Clone, Copy)]
pub(crate) struct TurnParameters<'a> {
    pub user_id: &'a str,
    pub access_token: &'a str,
    pub message: &'a str,
}

impl TurnRequest {
    /// Check required parameters in the order `message`, `userId`, `accessToken`
    ///
    /// Empty and whitespace-only values count as absent.
    ///
    /// # Errors
    ///
    /// Returns a missing-parameter error naming the first absent field
    pub(crate) fn parameters(&self) -> AppResult<TurnParameters<'_>> {
        fn present<'a>(value: Option<&'a String>, field: &str) -> AppResult<&'a str> {
            value
                .map(String::as_str)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::missing_parameter(field))
        }

        let message = present(self.message.as_ref(), "message")?;
        let user_id = present(self.user_id.as_ref(), "userId")?;
        let access_token = present(self.access_token.as_ref(), "accessToken")?;

        Ok(TurnParameters {
            user_id,
            access_token,
            message,
        })
    }
}

/// Result of one chat turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Text shown to the user
    pub reply_text: String,
    /// Pending track list to store back into the session
    pub updated_pending_tracks: Option<Vec<TrackUri>>,
    /// Transcript as written to the transcript store
    pub transcript_to_persist: Vec<ChatMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    fn request(message: Option<&str>, user: Option<&str>, token: Option<&str>) -> TurnRequest {
        TurnRequest {
            user_id: user.map(ToOwned::to_owned),
            access_token: token.map(ToOwned::to_owned),
            message: message.map(ToOwned::to_owned),
            pending_tracks: None,
        }
    }

    #[test]
    fn test_parameters_checked_in_order() {
        let err = request(None, None, None).parameters().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingParameter);
        assert_eq!(err.message, "Missing message");

        let err = request(Some("hi"), None, None).parameters().unwrap_err();
        assert_eq!(err.message, "Missing userId");

        let err = request(Some("hi"), Some("u1"), Some("   ")).parameters().unwrap_err();
        assert_eq!(err.message, "Missing accessToken");
    }

    #[test]
    fn test_parameters_present() {
        let req = request(Some("hello"), Some("u1"), Some("tok"));
        let params = req.parameters().unwrap();
        assert_eq!(params.message, "hello");
        assert_eq!(params.user_id, "u1");
        assert_eq!(params.access_token, "tok");
    }

    #[test]
    fn test_recommendation_format_parsing() {
        assert_eq!(
            RecommendationFormat::from_str_or_default("direct_uri"),
            RecommendationFormat::DirectUriList
        );
        assert_eq!(
            RecommendationFormat::from_str_or_default("named_list"),
            RecommendationFormat::NamedTitleList
        );
        assert_eq!(
            RecommendationFormat::from_str_or_default("something-else"),
            RecommendationFormat::NamedTitleList
        );
        assert_eq!(RecommendationFormat::DirectUriList.to_string(), "direct_uri");
    }
}
