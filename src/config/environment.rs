// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Reads ports, storage URLs, Spotify OAuth and completion API settings from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

//! Environment-based configuration management

use crate::constants::{completion, server, session, spotify};
use crate::conversation::RecommendationFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use tracing::{info, warn};

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL
    pub url: String,
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Redis URL; in-memory sessions are used when absent
    pub redis_url: Option<String>,
    /// Session lifetime in seconds
    pub ttl_secs: u64,
    /// Maximum sessions held in memory
    pub max_entries: usize,
    /// Expired-session sweep interval in seconds
    pub cleanup_interval_secs: u64,
}

/// Spotify OAuth and Web API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Registered redirect URI (points at `/callback`)
    pub redirect_uri: String,
    /// Requested scopes
    pub scopes: Vec<String>,
    /// Web API base URL
    pub api_base_url: String,
    /// Accounts service base URL
    pub accounts_base_url: String,
    /// Send a PKCE challenge with the authorization request
    pub use_pkce: bool,
}

impl fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("api_base_url", &self.api_base_url)
            .field("accounts_base_url", &self.accounts_base_url)
            .field("use_pkce", &self.use_pkce)
            .finish()
    }
}

/// Completion API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Bearer key for the completion API
    pub api_key: Option<String>,
    /// API base URL
    pub base_url: String,
    /// Model for interview turns
    pub chat_model: String,
    /// Model for playlist naming
    pub naming_model: String,
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("naming_model", &self.naming_model)
            .finish()
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated allowed origins, or `*`
    pub allowed_origins: String,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Session settings
    pub session: SessionConfig,
    /// Spotify settings
    pub spotify: SpotifyConfig,
    /// Completion API settings
    pub completion: CompletionConfig,
    /// CORS settings
    pub cors: CorsConfig,
    /// Frontend base URL, with trailing slash
    pub frontend_url: String,
    /// Output convention the instruction messages ask for
    pub recommendation_format: RecommendationFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or boolean variable fails to parse, or
    /// if validation fails
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {e}");
        }

        let config = Self {
            http_port: env_var_or("HTTP_PORT", &server::DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", server::DEFAULT_DATABASE_URL),
            },
            session: SessionConfig {
                redis_url: env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
                ttl_secs: env_var_or("SESSION_TTL_SECS", &session::DEFAULT_TTL_SECS.to_string())
                    .parse()
                    .context("Invalid SESSION_TTL_SECS value")?,
                max_entries: env_var_or(
                    "SESSION_MAX_ENTRIES",
                    &session::DEFAULT_MAX_ENTRIES.to_string(),
                )
                .parse()
                .context("Invalid SESSION_MAX_ENTRIES value")?,
                cleanup_interval_secs: env_var_or(
                    "SESSION_CLEANUP_INTERVAL_SECS",
                    &session::DEFAULT_CLEANUP_INTERVAL_SECS.to_string(),
                )
                .parse()
                .context("Invalid SESSION_CLEANUP_INTERVAL_SECS value")?,
            },
            spotify: SpotifyConfig {
                client_id: env_var_or("SPOTIFY_CLIENT_ID", ""),
                client_secret: env_var_or("SPOTIFY_CLIENT_SECRET", ""),
                redirect_uri: env_var_or("REDIRECT_URI", "http://localhost:4000/callback"),
                scopes: parse_scopes(&env_var_or("SPOTIFY_SCOPES", spotify::DEFAULT_SCOPES)),
                api_base_url: env_var_or("SPOTIFY_API_BASE", spotify::API_BASE_URL),
                accounts_base_url: env_var_or(
                    "SPOTIFY_ACCOUNTS_BASE",
                    spotify::ACCOUNTS_BASE_URL,
                ),
                use_pkce: env_var_or("SPOTIFY_USE_PKCE", "false")
                    .parse()
                    .context("Invalid SPOTIFY_USE_PKCE value")?,
            },
            completion: CompletionConfig {
                api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
                base_url: env_var_or("OPENAI_BASE_URL", completion::DEFAULT_BASE_URL),
                chat_model: env_var_or("OPENAI_CHAT_MODEL", completion::DEFAULT_CHAT_MODEL),
                naming_model: env_var_or(
                    "OPENAI_NAMING_MODEL",
                    completion::DEFAULT_NAMING_MODEL,
                ),
            },
            cors: CorsConfig {
                allowed_origins: env_var_or("CORS_ALLOWED_ORIGINS", server::DEFAULT_CORS_ORIGINS),
            },
            frontend_url: normalize_frontend_url(&env_var_or(
                "FRONTEND_URL",
                server::DEFAULT_FRONTEND_URL,
            )),
            recommendation_format: RecommendationFormat::from_str_or_default(&env_var_or(
                "RECOMMENDATION_FORMAT",
                "named_list",
            )),
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error when production is missing Spotify or completion credentials
    pub fn validate(&self) -> Result<()> {
        let spotify_missing =
            self.spotify.client_id.is_empty() || self.spotify.client_secret.is_empty();
        let completion_missing = self.completion.api_key.is_none();

        if self.environment.is_production() {
            if spotify_missing {
                return Err(anyhow::anyhow!(
                    "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are required in production"
                ));
            }
            if completion_missing {
                return Err(anyhow::anyhow!("OPENAI_API_KEY is required in production"));
            }
        } else {
            if spotify_missing {
                warn!("Spotify OAuth is missing client_id or client_secret; /login will fail");
            }
            if completion_missing {
                warn!("OPENAI_API_KEY is not set; chat turns will fail upstream");
            }
        }

        if self.session.ttl_secs == 0 {
            return Err(anyhow::anyhow!("SESSION_TTL_SECS must be greater than zero"));
        }

        Ok(())
    }

    /// Summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Playlist Chat Server Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Database: {}\n\
             - Sessions: {}\n\
             - Spotify OAuth: {}\n\
             - Completion API: {} (chat={}, naming={})\n\
             - Recommendation Format: {}\n\
             - CORS Origins: {}",
            self.http_port,
            self.environment,
            self.database.url,
            if self.session.redis_url.is_some() {
                "Redis"
            } else {
                "In-memory"
            },
            if self.spotify.client_id.is_empty() {
                "Disabled"
            } else {
                "Enabled"
            },
            self.completion.base_url,
            self.completion.chat_model,
            self.completion.naming_model,
            self.recommendation_format,
            self.cors.allowed_origins,
        )
    }
}

/// Read an environment variable, falling back to a default
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse space- or comma-separated scopes
fn parse_scopes(scopes_str: &str) -> Vec<String> {
    scopes_str
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Ensure the frontend URL ends with a slash so `chat` can be appended
fn normalize_frontend_url(url: &str) -> String {
    if url.ends_with('/') {
        url.to_owned()
    } else {
        format!("{url}/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scopes_accepts_spaces_and_commas() {
        let scopes =
            parse_scopes("user-read-private, playlist-modify-public playlist-modify-private");
        assert_eq!(
            scopes,
            vec![
                "user-read-private",
                "playlist-modify-public",
                "playlist-modify-private"
            ]
        );
    }

    #[test]
    fn test_normalize_frontend_url() {
        assert_eq!(
            normalize_frontend_url("http://localhost:3000"),
            "http://localhost:3000/"
        );
        assert_eq!(
            normalize_frontend_url("http://localhost:3000/"),
            "http://localhost:3000/"
        );
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(
            Environment::from_str_or_default("PROD"),
            Environment::Production
        );
        assert_eq!(
            Environment::from_str_or_default("test"),
            Environment::Testing
        );
        assert_eq!(
            Environment::from_str_or_default("anything"),
            Environment::Development
        );
    }
}
