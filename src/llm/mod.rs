// ABOUTME: Completion client abstraction for the chat-completion API driving the interview
// ABOUTME: Defines role-tagged messages, completion requests and the pluggable client trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! # Completion Client Interface
//!
//! The conversation engine talks to the language model only through
//! [`CompletionClient`]. Given an ordered transcript it returns one assistant
//! message.
//!
//! ## Example
//!
//! ```rust,no_run
//! use playlist_chat::llm::{ChatMessage, CompletionClient, CompletionRequest};
//!
//! async fn example(client: &dyn CompletionClient) {
//!     let request = CompletionRequest::new(vec![
//!         ChatMessage::system("You are an AI trained to generate Spotify playlists."),
//!         ChatMessage::user("I like hiking"),
//!     ]);
//!     let reply = client.complete(&request).await;
//! }
//! ```

mod openai;

pub use openai::{OpenAiClient, OpenAiConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ============================================================================
// Request Types
// ============================================================================

/// A chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Ordered transcript sent to the model
    pub messages: Vec<ChatMessage>,
    /// Model override; the client default is used when absent
    pub model: Option<String>,
}

impl CompletionRequest {
    /// Create a request over the given transcript
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
        }
    }

    /// Use a specific model for this request
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

// ============================================================================
// Client Trait
// ============================================================================

/// Chat-completion service used by the conversation engine
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Client name for logging
    fn name(&self) -> &'static str;

    /// Return one assistant message for the given transcript
    ///
    /// # Errors
    ///
    /// Returns an `UpstreamService` error on transport failures, non-success
    /// statuses, malformed bodies or an empty choice list
    async fn complete(&self, request: &CompletionRequest) -> AppResult<ChatMessage>;
}
