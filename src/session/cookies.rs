// ABOUTME: Session cookie construction and parsing helpers
// ABOUTME: Issues HttpOnly SameSite=Lax cookies and reads values from the Cookie header
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use axum::http::{header, HeaderMap, HeaderValue};
use tracing::warn;

use crate::constants::session::COOKIE_NAME;

/// Cookie attributes
#[derive(Debug, Clone)]
pub struct SecureCookieConfig {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Lifetime in seconds
    pub max_age_secs: u64,
    /// Hide the cookie from client-side scripts
    pub http_only: bool,
    /// Only send over HTTPS
    pub secure: bool,
    /// `SameSite` policy
    pub same_site: &'static str,
}

impl SecureCookieConfig {
    /// Create a cookie with `HttpOnly` and `SameSite=Lax`
    #[must_use]
    pub const fn new(name: String, value: String, max_age_secs: u64, secure: bool) -> Self {
        Self {
            name,
            value,
            max_age_secs,
            http_only: true,
            secure,
            same_site: "Lax",
        }
    }

    /// Render the `Set-Cookie` header value
    #[must_use]
    pub fn build(&self) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; Max-Age={}; SameSite={}",
            self.name, self.value, self.max_age_secs, self.same_site
        );
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Append a session cookie to response headers
pub fn set_session_cookie(
    headers: &mut HeaderMap,
    session_id: &str,
    max_age_secs: u64,
    secure: bool,
) {
    let cookie = SecureCookieConfig::new(
        COOKIE_NAME.to_owned(),
        session_id.to_owned(),
        max_age_secs,
        secure,
    );
    append_cookie(headers, &cookie);
}

/// Append an expired session cookie so the browser drops it
pub fn clear_session_cookie(headers: &mut HeaderMap, secure: bool) {
    let cookie = SecureCookieConfig::new(COOKIE_NAME.to_owned(), String::new(), 0, secure);
    append_cookie(headers, &cookie);
}

fn append_cookie(headers: &mut HeaderMap, cookie: &SecureCookieConfig) {
    match HeaderValue::from_str(&cookie.build()) {
        Ok(value) => {
            headers.append(header::SET_COOKIE, value);
        }
        Err(e) => warn!("Refusing to set invalid cookie {}: {e}", cookie.name),
    }
}

/// Read a cookie value from the request `Cookie` headers
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}
