pub mod message;

pub use message::{ChatSummary, Message, MessageKind};
