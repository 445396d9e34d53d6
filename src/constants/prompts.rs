// ABOUTME: Fixed instruction messages, greeting and reply templates for the playlist interview
// ABOUTME: Two instruction sets exist, one per recommendation output convention
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Playlist Chat Contributors

/// Role statement shared by both instruction sets
pub const ROLE_INSTRUCTION: &str = "You are an AI trained to generate Spotify playlists.";

/// Interview instruction shared by both instruction sets
pub const INTERVIEW_INSTRUCTION: &str = "As a music expert and psychologist, your task is to curate a personalized 10-track Spotify playlist for the user. Start by asking the user two questions, beginning with what they do in their free time, to gauge their personality.";

/// Instructions asking for a numbered list of titles after the marker phrase
pub const NAMED_LIST_INSTRUCTIONS: [&str; 3] = [
    "After the questions, provide the 10-track playlist as an array of track names. The playlist should be formatted as a numbered list, with each track on a new line.",
    "Start the playlist with the phrase \"Here are your tracks: \" and follow it with the playlist. Do not add any other messages after the playlist.",
    "The last line in your message should be the last song of the suggested playlist. Do not add any additional messages like \"I HOPE YOU LIKE IT\" after the playlist.",
];

/// Instructions asking for catalog-native track identifiers
pub const DIRECT_URI_INSTRUCTIONS: [&str; 2] = [
    "After the questions, provide the 10-track playlist as Spotify track URIs, one per line, each in the form spotify:track:<id>.",
    "Only include URIs of tracks that exist in the Spotify catalog, and write every URI in full.",
];

/// Opening assistant message of every fresh transcript
pub const GREETING: &str = "Hi, I'm your Spotify assistant. I'm going to ask you a few questions about yourself and, based on your answers, I'll put together a Spotify playlist tailored just for you. Let's start. What do you like to do in your free time?";

/// System instruction appended when asking the model for a playlist name
pub const PLAYLIST_NAME_INSTRUCTION: &str = "Assistant, please generate a 2-word creative Spotify playlist name based on the previous conversation. The name should reflect the user's preferences and the mood of the conversation. Please respond with just the 2-word playlist name.";

/// Heading of the reformatted named-list reply
pub const NAMED_LIST_HEADING: &str = "Here's your spotify playlist";

/// Question appended to every recommendation reply
pub const CONFIRMATION_QUESTION: &str =
    "Would you like me to save this playlist to your Spotify account? Reply \"yes\" to confirm.";

/// Prefix of the confirmation message; the playlist name follows
pub const SAVED_CONFIRMATION_PREFIX: &str =
    "Your playlist has been saved to your Spotify account. I named it: ";
