use crate::session::SessionStore;
use crate::types::MessageKind;

/// Placeholder answer used until answer generation exists
pub const DEFAULT_PLACEHOLDER_ANSWER: &str = "Answer generation is not available yet.";

/// Free-text input box.
///
/// Owns its input buffer. A submit appends the question followed by a
/// placeholder answer; nothing is generated.
#[derive(Debug, Clone)]
pub struct Composer {
    input: String,
    placeholder_answer: String,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDER_ANSWER)
    }
}

impl Composer {
    pub fn new(placeholder_answer: impl Into<String>) -> Self {
        Self {
            input: String::new(),
            placeholder_answer: placeholder_answer.into(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Submit the current input.
    ///
    /// Whitespace-only input is a silent no-op and the buffer is kept as is.
    /// Returns whether anything was appended.
    pub fn submit(&mut self, store: &mut SessionStore) -> bool {
        let text = self.input.trim();
        if text.is_empty() {
            return false;
        }

        store.append_message(MessageKind::Question, text);
        store.append_message(MessageKind::Answer, self.placeholder_answer.as_str());
        self.input.clear();
        true
    }
}
