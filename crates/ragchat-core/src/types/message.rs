use serde::{Deserialize, Serialize};

/// Kind of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Question,
    Answer,
    File,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Question => write!(f, "question"),
            MessageKind::Answer => write!(f, "answer"),
            MessageKind::File => write!(f, "file"),
        }
    }
}

/// One entry in the visible transcript.
///
/// Messages are immutable once appended; identical content may appear
/// several times (a repeated question is still two entries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub content: String,
}

impl Message {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    /// Create a question message
    pub fn question(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Question, content)
    }

    /// Create an answer message
    pub fn answer(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Answer, content)
    }

    /// Create a file message; `name` is the uploaded file's name, never its bytes
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(MessageKind::File, name)
    }
}

/// One past conversation in the sidebar history list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub title: String,
}

impl ChatSummary {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}
