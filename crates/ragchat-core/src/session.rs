//! In-memory session state.
//!
//! A [`SessionStore`] lives for one application run. Messages and history
//! entries are only ever appended; consumers always read the full ordered
//! slices.

use tokio::sync::watch;

use crate::types::{ChatSummary, Message, MessageKind};

/// Ordered transcript plus ordered history list for the current session
#[derive(Debug)]
pub struct SessionStore {
    messages: Vec<Message>,
    history: Vec<ChatSummary>,
    revision: watch::Sender<u64>,
}

impl SessionStore {
    /// Create a session seeded with one history entry and an empty transcript
    pub fn new(initial_title: impl Into<String>) -> Self {
        let mut store = Self::empty();
        store.append_chat_summary(initial_title);
        store
    }

    fn empty() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            messages: Vec::new(),
            history: Vec::new(),
            revision,
        }
    }

    /// Append a message to the end of the transcript
    pub fn append_message(&mut self, kind: MessageKind, content: impl Into<String>) {
        let message = Message::new(kind, content);
        tracing::debug!(kind = %message.kind, index = self.messages.len(), "Appending message");
        self.messages.push(message);
        self.bump();
    }

    /// Append a past conversation to the history list
    pub fn append_chat_summary(&mut self, title: impl Into<String>) {
        self.history.push(ChatSummary::new(title));
        self.bump();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn history(&self) -> &[ChatSummary] {
        &self.history
    }

    /// Number of appends applied so far
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that is notified after every append.
    ///
    /// The entry is already in place when the new revision is published.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}
