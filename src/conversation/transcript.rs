// ABOUTME: Transcript initialization and record-by-record serialization
// ABOUTME: Each message is stored as its own JSON text; one bad record invalidates the read
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

use super::RecommendationFormat;
use crate::constants::prompts;
use crate::errors::{AppError, AppResult};
use crate::llm::ChatMessage;

/// Fixed opening of every transcript: instructions followed by the greeting
#[must_use]
pub fn initial_transcript(format: RecommendationFormat) -> Vec<ChatMessage> {
    let format_instructions: &[&str] = match format {
        RecommendationFormat::NamedTitleList => &prompts::NAMED_LIST_INSTRUCTIONS,
        RecommendationFormat::DirectUriList => &prompts::DIRECT_URI_INSTRUCTIONS,
    };

    [prompts::ROLE_INSTRUCTION, prompts::INTERVIEW_INSTRUCTION]
        .iter()
        .chain(format_instructions)
        .map(|instruction| ChatMessage::system(*instruction))
        .chain(std::iter::once(ChatMessage::assistant(prompts::GREETING)))
        .collect()
}

/// Serialize every message into its own JSON record
///
/// # Errors
///
/// Returns an error if a message cannot be serialized
pub fn serialize_transcript(messages: &[ChatMessage]) -> AppResult<Vec<String>> {
    messages
        .iter()
        .map(|message| {
            serde_json::to_string(message)
                .map_err(|e| AppError::internal(format!("Failed to serialize message: {e}")))
        })
        .collect()
}

/// Parse stored records back into messages
///
/// # Errors
///
/// Returns a deserialization error naming the first record that fails to parse
pub fn deserialize_transcript<S: AsRef<str>>(records: &[S]) -> AppResult<Vec<ChatMessage>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            serde_json::from_str(record.as_ref()).map_err(|e| {
                AppError::deserialization(format!("Transcript record {index} is invalid: {e}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::llm::MessageRole;

    #[test]
    fn test_initial_transcript_named_list() {
        let transcript = initial_transcript(RecommendationFormat::NamedTitleList);
        assert_eq!(transcript.len(), 6);
        assert!(transcript[..5]
            .iter()
            .all(|m| m.role == MessageRole::System));
        assert_eq!(transcript[5], ChatMessage::assistant(prompts::GREETING));
        assert!(transcript[3].content.contains("Here are your tracks"));
    }

    #[test]
    fn test_initial_transcript_direct_uri() {
        let transcript = initial_transcript(RecommendationFormat::DirectUriList);
        assert_eq!(transcript.len(), 5);
        assert!(transcript
            .iter()
            .any(|m| m.content.contains("spotify:track:")));
    }

    #[test]
    fn test_round_trip() {
        let messages = vec![
            ChatMessage::system("rules"),
            ChatMessage::assistant("What do you do for fun?"),
            ChatMessage::user("I \"climb\" rocks\nand read"),
        ];
        let records = serialize_transcript(&messages).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(deserialize_transcript(&records).unwrap(), messages);
    }

    #[test]
    fn test_record_format_is_role_and_content() {
        let records = serialize_transcript(&[ChatMessage::user("hi")]).unwrap();
        assert_eq!(records[0], r#"{"role":"user","content":"hi"}"#);
    }

    #[test]
    fn test_single_bad_record_invalidates_read() {
        let records = vec![
            r#"{"role":"user","content":"hi"}"#.to_owned(),
            "not json".to_owned(),
        ];
        let err = deserialize_transcript(&records).unwrap_err();
        assert_eq!(err.code, ErrorCode::Deserialization);
        assert!(err.message.contains("record 1"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let records = [r#"{"role":"narrator","content":"hi"}"#];
        assert!(deserialize_transcript(&records).is_err());
    }
}
