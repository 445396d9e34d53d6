// ABOUTME: OAuth2 authorization-code client for the Spotify accounts service
// ABOUTME: Builds authorization URLs, generates state and PKCE values, exchanges codes for tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use crate::config::SpotifyConfig;
use crate::constants::{service_names, session, spotify};
use crate::errors::{AppError, AppResult};
use crate::utils::http_client::oauth_client;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::error;
use url::Url;

/// Length of a generated PKCE code verifier
const CODE_VERIFIER_LENGTH: usize = 64;

/// Fallback token lifetime when the provider omits or overflows `expires_in`
const DEFAULT_TOKEN_EXPIRY_SECONDS: i64 = 3600;

/// OAuth 2.0 client configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
    /// Redirect URI for OAuth callbacks
    pub redirect_uri: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
    /// Whether to use PKCE
    pub use_pkce: bool,
}

impl OAuth2Config {
    /// Build the Spotify client configuration from server settings
    #[must_use]
    pub fn spotify(config: &SpotifyConfig) -> Self {
        let accounts = config.accounts_base_url.trim_end_matches('/');
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: format!("{accounts}{}", spotify::AUTHORIZE_PATH),
            token_url: format!("{accounts}{}", spotify::TOKEN_PATH),
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            use_pkce: config.use_pkce,
        }
    }
}

/// `PKCE` parameters for the authorization-code flow
#[derive(Debug, Clone)]
pub struct PkceParams {
    /// Random code verifier kept in the session until the callback
    pub code_verifier: String,
    /// SHA256 of the verifier, base64url encoded
    pub code_challenge: String,
    /// Challenge method (always `S256`)
    pub code_challenge_method: String,
}

impl PkceParams {
    /// Generate `PKCE` parameters with the `S256` challenge method
    #[must_use]
    pub fn generate() -> Self {
        const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
        let mut rng = rand::thread_rng();
        let code_verifier: String = (0..CODE_VERIFIER_LENGTH)
            .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
            .collect();

        Self::from_verifier(code_verifier)
    }

    /// Derive the challenge for an existing verifier
    #[must_use]
    pub fn from_verifier(code_verifier: String) -> Self {
        let hash = Sha256::digest(code_verifier.as_bytes());
        Self {
            code_challenge: URL_SAFE_NO_PAD.encode(hash),
            code_verifier,
            code_challenge_method: "S256".into(),
        }
    }
}

/// OAuth 2.0 access token
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuth2Token {
    /// The access token string
    pub access_token: String,
    /// Token type (usually "Bearer")
    pub token_type: String,
    /// Expiration timestamp (UTC)
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token, when issued
    pub refresh_token: Option<String>,
    /// Granted scopes
    pub scope: Option<String>,
}

impl OAuth2Token {
    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|expires_at| expires_at <= Utc::now())
    }
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: Option<u64>,
    refresh_token: Option<String>,
    scope: Option<String>,
}

/// Generate the OAuth `state` parameter: random bytes, hex encoded
#[must_use]
pub fn generate_state() -> String {
    let mut bytes = [0_u8; session::OAUTH_STATE_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// OAuth 2.0 client for the Spotify accounts service
pub struct OAuth2Client {
    config: OAuth2Config,
    client: reqwest::Client,
}

impl OAuth2Client {
    /// Create a new `OAuth2` client
    #[must_use]
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            client: oauth_client(),
        }
    }

    /// Get the `OAuth2` configuration
    #[must_use]
    pub const fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Build the authorization URL the browser is redirected to
    ///
    /// # Errors
    ///
    /// Returns a config error if the client ID is missing or the authorization URL is malformed
    pub fn get_authorization_url(
        &self,
        state: &str,
        pkce: Option<&PkceParams>,
    ) -> AppResult<String> {
        if self.config.client_id.is_empty() {
            return Err(AppError::config("SPOTIFY_CLIENT_ID is not configured"));
        }

        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AppError::config(format!("Invalid auth URL: {e}")))?;

        let mut query_pairs = url.query_pairs_mut();
        query_pairs
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("state", state);

        if let Some(pkce) = pkce.filter(|_| self.config.use_pkce) {
            query_pairs
                .append_pair("code_challenge", &pkce.code_challenge)
                .append_pair("code_challenge_method", &pkce.code_challenge_method);
        }

        drop(query_pairs);
        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens
    ///
    /// # Errors
    ///
    /// Returns an `UpstreamService` error if the token request fails or the response is invalid
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: Option<&str>,
    ) -> AppResult<OAuth2Token> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        if let Some(verifier) = code_verifier.filter(|_| self.config.use_pkce) {
            params.push(("code_verifier", verifier));
        }

        let response = self
            .client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                error!("Token exchange request failed: {e}");
                AppError::upstream(service_names::SPOTIFY, format!("Token exchange failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Token exchange rejected ({status}): {body}");
            return Err(AppError::upstream(
                service_names::SPOTIFY,
                format!("Token exchange rejected ({status})"),
            ));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::upstream(
                service_names::SPOTIFY,
                format!("Invalid token response: {e}"),
            )
        })?;

        Ok(Self::token_from_response(token))
    }

    fn token_from_response(response: TokenResponse) -> OAuth2Token {
        let expires_at = response.expires_in.map(|seconds| {
            Utc::now()
                + Duration::seconds(
                    i64::try_from(seconds).unwrap_or(DEFAULT_TOKEN_EXPIRY_SECONDS),
                )
        });

        OAuth2Token {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at,
            refresh_token: response.refresh_token,
            scope: response.scope,
        }
    }
}
