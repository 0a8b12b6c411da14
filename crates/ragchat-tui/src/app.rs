use std::path::Path;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ragchat_config::Config;
use ragchat_core::{ChatController, ChatEvent, SelectedFile, Uploader};
use tokio::sync::{mpsc, watch};

/// Which widget receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Composer,
    FilePrompt,
    History,
}

pub struct App {
    controller: ChatController,
    uploader: Arc<dyn Uploader>,
    upload_tx: mpsc::UnboundedSender<ChatEvent>,
    upload_rx: mpsc::UnboundedReceiver<ChatEvent>,
    revisions: watch::Receiver<u64>,
    pub focus: Focus,
    pub path_input: String,
    pub history_cursor: usize,
    pub scroll_offset: usize,
    pub notice: Option<String>,
    pub upload_endpoint: String,
}

impl App {
    pub fn new(config: &Config, uploader: Arc<dyn Uploader>) -> Self {
        let (upload_tx, upload_rx) = mpsc::unbounded_channel();
        let controller = ChatController::new(
            config.chat.initial_chat_title.as_str(),
            config.chat.placeholder_answer.as_str(),
        );
        let revisions = controller.store().subscribe();

        Self {
            controller,
            uploader,
            upload_tx,
            upload_rx,
            revisions,
            focus: Focus::Composer,
            path_input: String::new(),
            history_cursor: 0,
            scroll_offset: 0,
            notice: None,
            upload_endpoint: config.upload.url(),
        }
    }

    pub fn controller(&self) -> &ChatController {
        &self.controller
    }

    /// Handle one key press. Returns `true` when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.focus {
            Focus::Composer => self.handle_composer_key(key),
            Focus::FilePrompt => self.handle_prompt_key(key),
            Focus::History => self.handle_history_key(key),
        }
        false
    }

    fn handle_composer_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('o') if ctrl => {
                self.path_input.clear();
                self.notice = None;
                self.focus = Focus::FilePrompt;
            }
            KeyCode::Char('u') if ctrl => {
                self.start_upload();
            }
            KeyCode::Tab => {
                self.focus = Focus::History;
            }
            KeyCode::Enter => {
                self.apply(ChatEvent::Submit);
            }
            KeyCode::Char(c) if !ctrl => {
                self.controller.composer_mut().push_char(c);
            }
            KeyCode::Backspace => {
                self.controller.composer_mut().pop_char();
            }
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(10),
            KeyCode::PageDown => self.scroll_down(10),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.focus = Focus::Composer;
            }
            KeyCode::Enter => {
                let raw = self.path_input.trim().to_string();
                if self.select_file(&raw) {
                    self.focus = Focus::Composer;
                }
            }
            KeyCode::Char(c) => {
                self.path_input.push(c);
            }
            KeyCode::Backspace => {
                self.path_input.pop();
            }
            _ => {}
        }
    }

    fn handle_history_key(&mut self, key: KeyEvent) {
        let len = self.controller.store().history().len();
        match key.code {
            KeyCode::Tab | KeyCode::Esc => {
                self.focus = Focus::Composer;
            }
            KeyCode::Up => {
                self.history_cursor = self.history_cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.history_cursor + 1 < len {
                    self.history_cursor += 1;
                }
            }
            KeyCode::Enter => {
                self.apply(ChatEvent::HistorySelected(self.history_cursor));
            }
            _ => {}
        }
    }

    /// Select the file at `raw`, mirroring a file picker that only offers
    /// existing files.
    fn select_file(&mut self, raw: &str) -> bool {
        if raw.is_empty() {
            return false;
        }

        let path = ragchat_config::expand_tilde(raw).unwrap_or_else(|| raw.into());
        if !Path::new(&path).is_file() {
            self.notice = Some(format!("No such file: {}", raw));
            return false;
        }

        match SelectedFile::from_path(&path) {
            Ok(file) => {
                self.notice = None;
                self.apply(ChatEvent::FileSelected(file));
                true
            }
            Err(e) => {
                self.notice = Some(e.to_string());
                false
            }
        }
    }

    /// Start an upload on a background task; the result comes back through
    /// [`next_upload_result`](App::next_upload_result).
    fn start_upload(&mut self) {
        let Some(file) = self.controller.dispatch(ChatEvent::UploadRequested) else {
            return;
        };

        let uploader = Arc::clone(&self.uploader);
        let tx = self.upload_tx.clone();
        tokio::spawn(async move {
            let result = uploader.upload(&file).await;
            if tx.send(ChatEvent::UploadFinished { file, result }).is_err() {
                tracing::warn!("UI loop gone before upload result arrived");
            }
        });
    }

    /// Wait for the next finished upload.
    ///
    /// The app keeps a sender of its own, so this never yields `None`.
    pub async fn next_upload_result(&mut self) -> Option<ChatEvent> {
        self.upload_rx.recv().await
    }

    pub fn apply(&mut self, event: ChatEvent) {
        self.controller.dispatch(event);
        self.follow_transcript();
    }

    /// Jump back to the newest message whenever the session grew
    fn follow_transcript(&mut self) {
        if self.revisions.has_changed().unwrap_or(false) {
            self.revisions.borrow_and_update();
            self.scroll_to_bottom();
        }
    }

    pub fn is_uploading(&self) -> bool {
        self.controller.submitter().is_in_flight()
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragchat_core::{Message, MessageKind, UploadError, UploadResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct StubUploader {
        succeed: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Uploader for StubUploader {
        async fn upload(&self, _file: &SelectedFile) -> UploadResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err(UploadError::Status { status: 502 })
            }
        }
    }

    fn app_with(succeed: bool) -> (App, Arc<StubUploader>) {
        let uploader = Arc::new(StubUploader {
            succeed,
            calls: AtomicUsize::new(0),
        });
        let app = App::new(&Config::default(), uploader.clone());
        (app, uploader)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    async fn settle(app: &mut App) {
        let event = app.next_upload_result().await.unwrap();
        assert!(matches!(event, ChatEvent::UploadFinished { .. }));
        app.apply(event);
        assert!(!app.is_uploading());
    }

    #[test]
    fn test_typing_and_enter_submits() {
        let (mut app, _) = app_with(true);
        type_text(&mut app, "hello");
        app.handle_key(key(KeyCode::Enter));

        let messages = app.controller().store().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], Message::question("hello"));
        assert_eq!(messages[1].kind, MessageKind::Answer);
        assert!(app.controller().composer().input().is_empty());
    }

    #[test]
    fn test_blank_enter_keeps_input() {
        let (mut app, _) = app_with(true);
        type_text(&mut app, "   ");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.controller().store().messages().is_empty());
        assert_eq!(app.controller().composer().input(), "   ");
    }

    #[test]
    fn test_ctrl_c_quits() {
        let (mut app, _) = app_with(true);
        assert!(app.handle_key(ctrl('c')));
        assert!(!app.handle_key(key(KeyCode::Char('c'))));
    }

    #[test]
    fn test_file_prompt_rejects_missing_file() {
        let (mut app, _) = app_with(true);
        app.handle_key(ctrl('o'));
        assert_eq!(app.focus, Focus::FilePrompt);

        type_text(&mut app, "/definitely/not/here.pdf");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.focus, Focus::FilePrompt);
        assert!(app.notice.as_deref().unwrap().contains("No such file"));
        assert!(app.controller().submitter().selected().is_none());

        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.focus, Focus::Composer);
    }

    #[tokio::test]
    async fn test_select_and_upload_appends_file_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, "x").unwrap();

        let (mut app, uploader) = app_with(true);
        app.handle_key(ctrl('o'));
        type_text(&mut app, &path.to_string_lossy());
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.focus, Focus::Composer);
        assert_eq!(app.controller().submitter().selected().unwrap().name(), "report.pdf");

        app.handle_key(ctrl('u'));
        assert!(app.is_uploading());
        settle(&mut app).await;

        assert_eq!(app.controller().store().messages(), &[Message::file("report.pdf")]);
        assert!(app.controller().submitter().selected().is_none());
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_file_and_composer_stays_usable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, "x").unwrap();

        let (mut app, uploader) = app_with(false);
        app.handle_key(ctrl('o'));
        type_text(&mut app, &path.to_string_lossy());
        app.handle_key(key(KeyCode::Enter));

        app.handle_key(ctrl('u'));
        // The composer keeps working while the upload runs
        type_text(&mut app, "still here");
        app.handle_key(key(KeyCode::Enter));
        settle(&mut app).await;

        assert_eq!(app.controller().store().messages().len(), 2);
        assert!(app.controller().submitter().selected().is_some());
        assert!(app.notice.is_none());

        app.handle_key(ctrl('u'));
        settle(&mut app).await;
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_upload_without_selection_does_nothing() {
        let (mut app, uploader) = app_with(true);
        app.handle_key(ctrl('u'));
        assert!(!app.is_uploading());
        assert_eq!(uploader.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_history_selection() {
        let (mut app, _) = app_with(true);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::History);

        // Only the seeded entry exists
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.history_cursor, 0);

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.controller().active_history(), Some(0));
        assert!(app.controller().store().messages().is_empty());

        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Composer);
    }

    #[test]
    fn test_new_messages_reset_scroll() {
        let (mut app, _) = app_with(true);
        app.handle_key(key(KeyCode::PageUp));
        assert_eq!(app.scroll_offset, 10);

        type_text(&mut app, "q");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.scroll_offset, 0);
    }

    #[tokio::test]
    async fn test_scroll_follows_store_only_when_it_grows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, "x").unwrap();

        let (mut app, _) = app_with(false);
        app.apply(ChatEvent::FileSelected(SelectedFile::from_path(&path).unwrap()));
        app.handle_key(key(KeyCode::PageUp));

        // A failed upload appends nothing, so the reader stays where they were
        app.handle_key(ctrl('u'));
        settle(&mut app).await;
        assert_eq!(app.scroll_offset, 10);

        // History selection does not touch the transcript either
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.scroll_offset, 10);
    }

    #[tokio::test]
    async fn test_successful_upload_scrolls_to_new_entry() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, "x").unwrap();

        let (mut app, _) = app_with(true);
        app.apply(ChatEvent::FileSelected(SelectedFile::from_path(&path).unwrap()));
        app.handle_key(key(KeyCode::PageUp));

        app.handle_key(ctrl('u'));
        settle(&mut app).await;
        assert_eq!(app.scroll_offset, 0);
        assert_eq!(app.controller().store().messages(), &[Message::file("report.pdf")]);
    }
}
