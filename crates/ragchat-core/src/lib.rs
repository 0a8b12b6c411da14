//! Client-side chat session model.
//!
//! The session is an append-only transcript plus a history list. Input
//! widgets emit [`ChatEvent`]s and the [`ChatController`] applies them; the
//! only side effect is the file upload, performed through an [`Uploader`].

pub mod composer;
pub mod controller;
pub mod error;
pub mod events;
pub mod session;
pub mod submitter;
pub mod types;
pub mod uploader;

pub use composer::{Composer, DEFAULT_PLACEHOLDER_ANSWER};
pub use controller::ChatController;
pub use error::{FileSelectError, UploadError, UploadResult};
pub use events::ChatEvent;
pub use session::SessionStore;
pub use submitter::{FileSubmitter, SelectedFile, UploadOutcome};
pub use types::{ChatSummary, Message, MessageKind};
pub use uploader::{Uploader, FILE_FIELD};
