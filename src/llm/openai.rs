// ABOUTME: OpenAI-compatible chat completion client used for interview turns and playlist naming
// ABOUTME: Maps transport, status and parsing failures onto upstream service errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! # `OpenAI` Completion Client
//!
//! Works with the `OpenAI` chat completions endpoint and any compatible server.
//!
//! ## Configuration
//!
//! - `OPENAI_API_KEY`: bearer key (optional for local servers)
//! - `OPENAI_BASE_URL`: base URL (default: <https://api.openai.com/v1>)
//! - `OPENAI_CHAT_MODEL`: default model (default: `gpt-3.5-turbo`)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use super::{ChatMessage, CompletionClient, CompletionRequest, MessageRole};
use crate::config::CompletionConfig;
use crate::constants::{completion, service_names};
use crate::errors::{AppError, AppResult};

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Chat completions request body
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
}

/// Message structure for the completions API
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        Self {
            role: msg.role.as_str().to_owned(),
            content: msg.content.clone(),
        }
    }
}

/// Chat completions response body
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    model: Option<String>,
}

/// Choice in response
#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Message in response
#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

/// Error response structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Client Configuration
// ============================================================================

/// Configuration for [`OpenAiClient`]
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Bearer key (optional for local servers)
    pub api_key: Option<String>,
    /// Model used when a request does not name one
    pub default_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: completion::DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            default_model: completion::DEFAULT_CHAT_MODEL.to_owned(),
        }
    }
}

impl From<&CompletionConfig> for OpenAiConfig {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            default_model: config.chat_model.clone(),
        }
    }
}

// ============================================================================
// Client Implementation
// ============================================================================

/// `OpenAI`-compatible completion client
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(completion::CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(completion::REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            "Initializing completion client: base_url={}, model={}",
            config.base_url, config.default_model
        );

        Ok(Self { client, config })
    }

    /// Create a client from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_env() -> AppResult<Self> {
        let config = OpenAiConfig {
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| completion::DEFAULT_BASE_URL.to_owned()),
            api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            default_model: env::var("OPENAI_CHAT_MODEL")
                .unwrap_or_else(|_| completion::DEFAULT_CHAT_MODEL.to_owned()),
        };
        Self::new(config)
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Add authorization header if an API key is configured
    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.header("Authorization", format!("Bearer {api_key}"))
        } else {
            request
        }
    }

    /// Translate a non-success response into an upstream error
    fn parse_error_response(status: reqwest::StatusCode, body: &str) -> AppError {
        let service = service_names::COMPLETION_API;

        if let Ok(error_response) = serde_json::from_str::<OpenAiErrorResponse>(body) {
            let detail = error_response.error.message;
            match status.as_u16() {
                401 => AppError::upstream(service, format!("API authentication failed: {detail}")),
                429 => {
                    AppError::upstream(service, format!("Rate limit or quota exceeded: {detail}"))
                }
                400 => AppError::upstream(service, format!("Request rejected: {detail}")),
                404 => {
                    AppError::upstream(service, format!("Model or endpoint not found: {detail}"))
                }
                503 => AppError::upstream(service, format!("Service unavailable: {detail}")),
                _ => {
                    let error_type = error_response
                        .error
                        .error_type
                        .unwrap_or_else(|| "unknown".to_owned());
                    AppError::upstream(service, format!("{error_type} - {detail}"))
                }
            }
        } else {
            AppError::upstream(
                service,
                format!(
                    "API error ({status}): {}",
                    body.chars().take(200).collect::<String>()
                ),
            )
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    #[instrument(
        skip(self, request),
        fields(
            model = %request.model.as_deref().unwrap_or(&self.config.default_model),
            messages = request.messages.len(),
        )
    )]
    async fn complete(&self, request: &CompletionRequest) -> AppResult<ChatMessage> {
        let service = service_names::COMPLETION_API;
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let body = OpenAiRequest {
            model: model.to_owned(),
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
        };

        debug!("Sending chat completion request with {} messages", body.messages.len());

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Content-Type", "application/json")
            .json(&body);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send completion request: {e}");
                if e.is_timeout() {
                    AppError::upstream(service, "Request timed out")
                } else {
                    AppError::upstream(service, format!("Failed to connect: {e}"))
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("Failed to read completion response: {e}");
            AppError::upstream(service, format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &text));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&text).map_err(|e| {
            error!(
                "Failed to parse completion response: {e} - body: {}",
                text.chars().take(500).collect::<String>()
            );
            AppError::upstream(service, format!("Failed to parse response: {e}"))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::upstream(service, "API returned no choices"))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| AppError::upstream(service, "API returned an empty message"))?;

        debug!(
            model = parsed.model.as_deref().unwrap_or(model),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            content_len = content.len(),
            "Received chat completion"
        );

        Ok(ChatMessage::new(MessageRole::Assistant, content))
    }
}
