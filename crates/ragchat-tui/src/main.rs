use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use clap::Parser;
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;

mod app;
mod logging;
mod ui;

use app::App;
use ragchat_client::HttpUploader;
use ragchat_config::ConfigManager;

#[derive(Parser)]
#[command(name = "ragchat-tui")]
#[command(about = "Terminal chat front-end with document upload")]
#[command(version)]
struct Cli {
    /// Config file path (defaults to $RAGCHAT_CONFIG or ~/.ragchat/config.json)
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = ragchat_config::resolve_config_path(cli.config.as_deref())?;
    let config = ConfigManager::load(&config_path).await?.snapshot().await;
    let _log_guard = logging::init(&config.logging)?;

    let uploader = HttpUploader::from_config(&config.upload)?;
    tracing::info!("Upload endpoint: {}", uploader.endpoint());
    let mut app = App::new(&config, Arc::new(uploader));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!("UI loop failed: {:?}", err);
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    let mut events = EventStream::new();

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Redraw only after input or a finished upload
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    if key.kind == KeyEventKind::Press && app.handle_key(key) {
                        return Ok(());
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => return Ok(()),
            },
            Some(result) = app.next_upload_result() => app.apply(result),
        }
    }
}
