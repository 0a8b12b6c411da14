//! Owner of the session state.

use crate::composer::Composer;
use crate::events::ChatEvent;
use crate::session::SessionStore;
use crate::submitter::{FileSubmitter, SelectedFile, UploadOutcome};
use crate::types::ChatSummary;
use crate::uploader::Uploader;

/// Applies [`ChatEvent`]s to the session.
///
/// Selecting a history entry only marks it active and logs it; the
/// transcript is left untouched.
#[derive(Debug)]
pub struct ChatController {
    store: SessionStore,
    composer: Composer,
    submitter: FileSubmitter,
    active_history: Option<usize>,
}

impl ChatController {
    pub fn new(initial_title: impl Into<String>, placeholder_answer: impl Into<String>) -> Self {
        Self {
            store: SessionStore::new(initial_title),
            composer: Composer::new(placeholder_answer),
            submitter: FileSubmitter::new(),
            active_history: None,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// The composer's input buffer is its own state; editing it does not go
    /// through events.
    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    pub fn submitter(&self) -> &FileSubmitter {
        &self.submitter
    }

    pub fn active_history(&self) -> Option<usize> {
        self.active_history
    }

    /// Apply one event.
    ///
    /// `UploadRequested` returns the file to upload when an attempt should
    /// start; the caller runs it and reports back with `UploadFinished`.
    pub fn dispatch(&mut self, event: ChatEvent) -> Option<SelectedFile> {
        match event {
            ChatEvent::Submit => {
                self.composer.submit(&mut self.store);
                None
            }
            ChatEvent::FileSelected(file) => {
                self.submitter.select(file);
                None
            }
            ChatEvent::UploadRequested => self.submitter.begin_upload(),
            ChatEvent::UploadFinished { file, result } => {
                self.submitter.finish_upload(file, result, &mut self.store);
                None
            }
            ChatEvent::HistorySelected(index) => {
                self.select_history(index);
                None
            }
        }
    }

    /// Upload the selected file and wait for the result
    pub async fn upload<U>(&mut self, uploader: &U) -> UploadOutcome
    where
        U: Uploader + ?Sized,
    {
        self.submitter.upload(uploader, &mut self.store).await
    }

    fn select_history(&mut self, index: usize) {
        match self.store.history().get(index) {
            Some(ChatSummary { title }) => {
                tracing::info!(index, title = %title, "Chat history entry selected");
                self.active_history = Some(index);
            }
            None => {
                tracing::warn!(index, "Ignoring selection of unknown history entry");
            }
        }
    }
}
