//! Line commands for the interactive chat.

use serde::Serialize;

use ragchat_core::{ChatSummary, Message, SessionStore, FILE_FIELD};

/// One line typed at the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Plain text, handed to the composer
    Ask(String),
    /// `/file <path>`
    SelectFile(String),
    /// `/upload`
    Upload,
    /// `/history`
    History,
    /// `/open <n>`, 1-based as printed by `/history`
    Open(usize),
    /// `/transcript`
    Transcript,
    /// `/help`
    Help,
    /// `exit`, `quit`, `/quit`
    Quit,
    /// Unrecognised slash command or bad argument
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  <text>          ask a question
  /file <path>    select a file to upload
  /upload         upload the selected file
  /history        list past chats
  /open <n>       open a past chat
  /transcript     print the session as JSON
  /quit           leave";

pub fn parse_line(line: &str) -> ChatCommand {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        return ChatCommand::Quit;
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        // Keep the raw line; the composer does its own trimming
        return ChatCommand::Ask(line.to_string());
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "file" if !arg.is_empty() => ChatCommand::SelectFile(arg.to_string()),
        "file" => ChatCommand::Invalid("/file needs a path".to_string()),
        "upload" => ChatCommand::Upload,
        "history" => ChatCommand::History,
        "open" => match arg.parse::<usize>() {
            Ok(n) if n >= 1 => ChatCommand::Open(n - 1),
            _ => ChatCommand::Invalid(format!("/open needs an entry number, got '{}'", arg)),
        },
        "transcript" => ChatCommand::Transcript,
        "help" => ChatCommand::Help,
        "quit" | "exit" => ChatCommand::Quit,
        other => ChatCommand::Invalid(format!("Unknown command: /{}", other)),
    }
}

/// Parse a `name=value` form field argument
pub fn parse_field(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, _)) if name == FILE_FIELD => Err(format!(
            "'{}' is the uploaded file's own field and cannot be overridden",
            FILE_FIELD
        )),
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected name=value, got '{}'", raw)),
    }
}

#[derive(Serialize)]
struct TranscriptDump<'a> {
    history: &'a [ChatSummary],
    messages: &'a [Message],
}

/// JSON dump of both session sequences
pub fn transcript_json(store: &SessionStore) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&TranscriptDump {
        history: store.history(),
        messages: store.messages(),
    })
}
