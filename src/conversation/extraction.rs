// ABOUTME: Detects finished playlist recommendations in model replies and resolves their tracks
// ABOUTME: Supports embedded track URIs and numbered title lists after a marker phrase
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::{debug, info};

use super::RecommendationFormat;
use crate::constants::markers::{NAMED_LIST_MARKER, TRACK_URI_PATTERN};
use crate::constants::prompts::{CONFIRMATION_QUESTION, NAMED_LIST_HEADING};
use crate::errors::AppResult;
use crate::spotify::{MusicCatalog, TrackUri};

/// Quote characters removed from candidate titles
const QUOTE_CHARS: [char; 3] = ['"', '\u{201C}', '\u{201D}'];

/// A recognized recommendation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Convention the reply was recognized under
    pub format: RecommendationFormat,
    /// Resolved track identifiers, in reply order
    pub tracks: Vec<TrackUri>,
    /// Text shown to the user in place of the raw reply
    pub display_text: String,
}

fn track_uri_regex() -> Option<&'static Regex> {
    static TRACK_URI_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    TRACK_URI_REGEX
        .get_or_init(|| Regex::new(TRACK_URI_PATTERN).ok())
        .as_ref()
}

/// Decide which convention, if any, a reply uses
///
/// Embedded track URIs take precedence over the marker phrase.
#[must_use]
pub fn detect_format(reply: &str) -> Option<RecommendationFormat> {
    if track_uri_regex().is_some_and(|re| re.is_match(reply)) {
        return Some(RecommendationFormat::DirectUriList);
    }
    if reply.to_lowercase().contains(NAMED_LIST_MARKER) {
        return Some(RecommendationFormat::NamedTitleList);
    }
    None
}

/// Scan a reply for track URIs, keeping the first appearance of each
#[must_use]
pub fn find_track_uris(reply: &str) -> Vec<TrackUri> {
    let Some(re) = track_uri_regex() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    re.find_iter(reply)
        .map(|m| m.as_str())
        .filter(|uri| seen.insert(*uri))
        .map(TrackUri::new)
        .collect()
}

/// Leading marker of one list item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListOrdinal {
    /// `1.`, `2)`, `3:` or `4 -`
    Number(u32),
    /// `-`, `*` or `•` followed by whitespace
    Bullet,
}

impl ListOrdinal {
    /// Whether `next` continues a list that so far ended with `self`
    fn continued_by(self, next: Self) -> bool {
        match (self, next) {
            (Self::Number(prev), Self::Number(n)) => prev.checked_add(1) == Some(n),
            (Self::Bullet, Self::Bullet) => true,
            _ => false,
        }
    }
}

/// Split off a leading list ordinal such as `1.`, `2)`, `3 -` or a `-`/`*` bullet
///
/// Returns the ordinal and the remainder when one was present.
fn parse_ordinal(line: &str) -> Option<(ListOrdinal, &str)> {
    let line = line.trim_start();

    if let Some(rest) = line
        .strip_prefix(['-', '*', '\u{2022}'])
        .filter(|rest| rest.starts_with(char::is_whitespace))
    {
        return Some((ListOrdinal::Bullet, rest));
    }

    let digits_end = line
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(line.len(), |(i, _)| i);
    if digits_end == 0 {
        return None;
    }
    let number = line[..digits_end].parse().ok()?;

    let after_digits = &line[digits_end..];
    after_digits
        .strip_prefix(['.', ')', ':'])
        .or_else(|| after_digits.trim_start().strip_prefix('-'))
        .map(|rest| (ListOrdinal::Number(number), rest))
}

fn strip_ordinal(line: &str) -> Option<&str> {
    parse_ordinal(line).map(|(_, rest)| rest)
}

/// Collect the items of the list that starts at the first ordinal line
///
/// Blank lines between items are skipped. The list ends at the first other
/// line whose ordinal does not continue the sequence (the next number, or
/// another bullet).
fn ordered_items<'a>(candidates: &[&'a str]) -> Vec<&'a str> {
    let mut items = Vec::new();
    let mut last: Option<ListOrdinal> = None;

    for line in candidates {
        if line.trim().is_empty() {
            continue;
        }
        match (last, parse_ordinal(line)) {
            (None, Some((ordinal, _))) => last = Some(ordinal),
            (None, None) => continue,
            (Some(prev), Some((ordinal, _))) if prev.continued_by(ordinal) => {
                last = Some(ordinal);
            }
            (Some(_), _) => break,
        }
        items.push(*line);
    }
    items
}

/// Normalize one candidate line into a song title
fn clean_title(line: &str) -> String {
    let without_ordinal = strip_ordinal(line).unwrap_or(line);
    without_ordinal
        .trim()
        .chars()
        .filter(|c| !QUOTE_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_owned()
}

/// Collect the song titles listed after the named-list marker
///
/// When the list is numbered or bulleted, only the consecutive items of that
/// list count, so intro and closing sentences are skipped. Otherwise the
/// titles are the first run of non-blank lines after the marker.
#[must_use]
pub fn named_titles(reply: &str) -> Vec<String> {
    let lines: Vec<&str> = reply.lines().collect();
    let Some(marker_index) = lines
        .iter()
        .position(|line| line.to_lowercase().contains(NAMED_LIST_MARKER))
    else {
        return Vec::new();
    };
    let candidates = &lines[marker_index + 1..];

    let titles: Vec<String> = if candidates.iter().any(|line| strip_ordinal(line).is_some()) {
        ordered_items(candidates).into_iter().map(clean_title).collect()
    } else {
        candidates
            .iter()
            .skip_while(|line| line.trim().is_empty())
            .take_while(|line| !line.trim().is_empty())
            .map(|line| clean_title(line))
            .collect()
    };

    titles.into_iter().filter(|title| !title.is_empty()).collect()
}

/// Recognize a finished recommendation and resolve it to track identifiers
///
/// Named titles are looked up one at a time, in order; titles without a
/// catalog match are dropped. Returns `None` when the reply holds no
/// recommendation or nothing resolved.
///
/// # Errors
///
/// Returns an upstream error if a catalog lookup fails
pub async fn extract_tracks(
    reply: &str,
    catalog: &dyn MusicCatalog,
    access_token: &str,
) -> AppResult<Option<Extraction>> {
    let Some(format) = detect_format(reply) else {
        return Ok(None);
    };

    match format {
        RecommendationFormat::DirectUriList => {
            let tracks = find_track_uris(reply);
            if tracks.is_empty() {
                return Ok(None);
            }
            debug!("Found {} track URIs in reply", tracks.len());
            Ok(Some(Extraction {
                format,
                tracks,
                display_text: format!("{reply}\n\n{CONFIRMATION_QUESTION}"),
            }))
        }
        RecommendationFormat::NamedTitleList => {
            let titles = named_titles(reply);
            let mut tracks = Vec::with_capacity(titles.len());
            let mut resolved_titles = Vec::with_capacity(titles.len());

            for title in titles {
                match catalog.search_track(access_token, &title).await? {
                    Some(uri) => {
                        tracks.push(uri);
                        resolved_titles.push(title);
                    }
                    None => debug!(title = %title, "No catalog match for title"),
                }
            }

            if tracks.is_empty() {
                return Ok(None);
            }
            info!("Resolved {} titles from recommendation", tracks.len());

            Ok(Some(Extraction {
                format,
                tracks,
                display_text: format!(
                    "{NAMED_LIST_HEADING}\n\n{}\n\n{CONFIRMATION_QUESTION}",
                    resolved_titles.join("\n")
                ),
            }))
        }
    }
}
