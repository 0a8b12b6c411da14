use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Focus};
use ragchat_core::{ChatSummary, Message, MessageKind};

const SIDEBAR_WIDTH: u16 = 28;

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(f.size());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(rows[1]);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Transcript
            Constraint::Length(3), // Input
            Constraint::Length(3), // File
        ])
        .split(columns[1]);

    draw_header(f, app, rows[0]);
    draw_history(f, app, columns[0]);
    draw_transcript(f, app, main[0]);
    draw_input(f, app, main[1]);
    draw_file_bar(f, app, main[2]);
    draw_status_bar(f, app, rows[2]);
}

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Blue)
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let header_text = Line::from(vec![
        Span::styled(
            " RAG Chat",
            Style::default()
                .add_modifier(Modifier::BOLD)
                .fg(Color::Cyan),
        ),
        Span::styled("  |  ", Style::default().fg(Color::Gray)),
        Span::styled(app.upload_endpoint.as_str(), Style::default().fg(Color::DarkGray)),
        if app.is_uploading() {
            Span::styled("  ◐ Uploading...", Style::default().fg(Color::Yellow))
        } else {
            Span::raw("")
        },
    ]);

    let header = Paragraph::new(header_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .alignment(Alignment::Left);

    f.render_widget(header, area);
}

/// One sidebar row; the active conversation carries a marker
pub fn history_line(summary: &ChatSummary, active: bool) -> Line<'_> {
    let marker = if active { "● " } else { "  " };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Green)),
        Span::raw(summary.title.as_str()),
    ])
}

pub fn history_items(history: &[ChatSummary], active: Option<usize>) -> Vec<ListItem<'_>> {
    history
        .iter()
        .enumerate()
        .map(|(idx, summary)| ListItem::new(history_line(summary, active == Some(idx))))
        .collect()
}

fn draw_history(f: &mut Frame, app: &App, area: Rect) {
    let controller = app.controller();
    let focused = app.focus == Focus::History;

    let list = List::new(history_items(
        controller.store().history(),
        controller.active_history(),
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("History")
            .border_style(border_style(focused)),
    )
    .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.history_cursor));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn kind_style(kind: MessageKind) -> (&'static str, Style) {
    match kind {
        MessageKind::Question => ("You  ", Style::default().fg(Color::Cyan)),
        MessageKind::Answer => ("Bot  ", Style::default().fg(Color::Green)),
        MessageKind::File => ("File ", Style::default().fg(Color::Yellow)),
    }
}

/// Render one message; the kind only changes prefix and color
pub fn message_lines(msg: &Message) -> Vec<Line<'_>> {
    let (prefix, style) = kind_style(msg.kind);
    let mut lines = Vec::new();

    for (i, text) in msg.content.lines().enumerate() {
        let lead = if i == 0 { prefix } else { "     " };
        let body = if msg.kind == MessageKind::File {
            Span::styled(text, style.add_modifier(Modifier::UNDERLINED))
        } else {
            Span::styled(text, style)
        };
        lines.push(Line::from(vec![
            Span::styled(lead, style.add_modifier(Modifier::BOLD)),
            body,
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(prefix, style.add_modifier(Modifier::BOLD))));
    }

    // Empty line for separation
    lines.push(Line::from(""));
    lines
}

/// All messages in append order
pub fn transcript_lines(messages: &[Message]) -> Vec<Line<'_>> {
    messages.iter().flat_map(message_lines).collect()
}

/// Rows the lines occupy once wrapped to `width` columns
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| {
            let w: usize = line.spans.iter().map(|s| s.content.width()).sum();
            w.max(1).div_ceil(width)
        })
        .sum()
}

fn draw_transcript(f: &mut Frame, app: &App, area: Rect) {
    let messages = app.controller().store().messages();
    let lines = transcript_lines(messages);

    let inner_height = usize::from(area.height.saturating_sub(2));
    let inner_width = area.width.saturating_sub(2);
    let total = wrapped_height(&lines, inner_width);
    let max_scroll = total.saturating_sub(inner_height);
    let top = max_scroll.saturating_sub(app.scroll_offset.min(max_scroll));

    let title = format!("Messages ({})", messages.len());
    let transcript = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style(false)),
        )
        .wrap(Wrap { trim: false })
        .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0));

    f.render_widget(transcript, area);
}

fn draw_input(f: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Composer | Focus::FilePrompt);

    let (title, line) = match app.focus {
        Focus::FilePrompt => (
            "Select file (Enter to confirm, Esc to cancel)",
            Line::from(vec![
                Span::styled("path> ", Style::default().fg(Color::Yellow)),
                Span::raw(app.path_input.as_str()),
                Span::styled("▌", Style::default().fg(Color::Yellow)),
            ]),
        ),
        _ => {
            let input = app.controller().composer().input();
            let line = if input.is_empty() {
                Line::from(vec![
                    Span::styled("> ", Style::default().fg(Color::Green)),
                    Span::styled(
                        "Type a question and press Enter...",
                        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                    ),
                ])
            } else {
                Line::from(vec![
                    Span::styled("> ", Style::default().fg(Color::Green)),
                    Span::styled(input, Style::default().fg(Color::White)),
                    Span::styled("▌", Style::default().fg(Color::Green)),
                ])
            };
            ("Input", line)
        }
    };

    let input = Paragraph::new(line)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style(focused)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(input, area);
}

fn draw_file_bar(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(notice) = &app.notice {
        Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Red)))
    } else {
        match app.controller().submitter().selected() {
            Some(file) => Line::from(vec![
                Span::styled("📄 ", Style::default()),
                Span::styled(file.name(), Style::default().fg(Color::Yellow)),
                if app.is_uploading() {
                    Span::styled("  uploading...", Style::default().fg(Color::Gray))
                } else {
                    Span::styled("  [Ctrl+U] upload", Style::default().fg(Color::Gray))
                },
            ]),
            None => Line::from(Span::styled(
                "No file selected  [Ctrl+O] choose file",
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            )),
        }
    };

    let bar = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("File")
            .border_style(border_style(false)),
    );
    f.render_widget(bar, area);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.focus {
        Focus::Composer => "[Enter] Send  [Ctrl+O] File  [Ctrl+U] Upload  [Tab] History  [Ctrl+C] Quit",
        Focus::FilePrompt => "[Enter] Select  [Esc] Cancel  [Ctrl+C] Quit",
        Focus::History => "[↑/↓] Move  [Enter] Open  [Tab] Back  [Ctrl+C] Quit",
    };

    let status = format!(
        " Messages: {} | Scroll: {} | {}",
        app.controller().store().messages().len(),
        app.scroll_offset,
        help_text
    );

    let status_bar = Paragraph::new(status)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::REVERSED));

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragchat_config::Config;
    use ragchat_core::{SelectedFile, UploadResult, Uploader};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    struct NoopUploader;

    #[async_trait]
    impl Uploader for NoopUploader {
        async fn upload(&self, _file: &SelectedFile) -> UploadResult<()> {
            Ok(())
        }
    }

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_transcript_preserves_order() {
        let messages = vec![
            Message::question("first"),
            Message::answer("second"),
            Message::file("third.pdf"),
        ];

        let text: Vec<String> = transcript_lines(&messages)
            .iter()
            .map(line_text)
            .filter(|l| !l.is_empty())
            .collect();

        assert_eq!(text, vec!["You  first", "Bot  second", "File third.pdf"]);
    }

    #[test]
    fn test_multiline_message_is_indented() {
        let msg = Message::question("one\ntwo");
        let lines = message_lines(&msg);
        assert_eq!(line_text(&lines[0]), "You  one");
        assert_eq!(line_text(&lines[1]), "     two");
        assert_eq!(line_text(&lines[2]), "");
    }

    #[test]
    fn test_history_marks_active_entry() {
        let history = vec![ChatSummary::new("New chat"), ChatSummary::new("Older")];
        assert_eq!(history_items(&history, Some(1)).len(), 2);

        let rows: Vec<String> = history
            .iter()
            .enumerate()
            .map(|(idx, summary)| line_text(&history_line(summary, idx == 1)))
            .collect();
        assert_eq!(rows, vec!["  New chat", "● Older"]);
    }

    #[test]
    fn test_wrapped_height() {
        let lines = vec![Line::from("abcdefghij"), Line::from("")];
        assert_eq!(wrapped_height(&lines, 4), 3 + 1);
        assert_eq!(wrapped_height(&lines, 20), 2);
    }

    #[test]
    fn test_draw_smoke() {
        let mut app = App::new(&Config::default(), Arc::new(NoopUploader));
        for c in "hello".chars() {
            app.handle_key(crossterm::event::KeyEvent::new(
                crossterm::event::KeyCode::Char(c),
                crossterm::event::KeyModifiers::NONE,
            ));
        }

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, &app)).unwrap();

        let screen = |terminal: &Terminal<TestBackend>| -> String {
            terminal
                .backend()
                .buffer()
                .content
                .iter()
                .map(|cell| cell.symbol.as_str())
                .collect()
        };
        assert!(!screen(&terminal).contains("● New chat"));

        app.handle_key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Tab,
            crossterm::event::KeyModifiers::NONE,
        ));
        app.handle_key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Enter,
            crossterm::event::KeyModifiers::NONE,
        ));
        assert_eq!(app.focus, Focus::History);
        terminal.draw(|f| draw(f, &app)).unwrap();
        assert!(screen(&terminal).contains("● New chat"));
    }
}
