use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

mod repl;

use ragchat_client::HttpUploader;
use ragchat_config::{Config, ConfigManager};
use ragchat_core::{ChatController, ChatEvent, Message, MessageKind, SelectedFile, UploadOutcome};
use repl::{parse_line, ChatCommand};

#[derive(Parser)]
#[command(name = "ragchat-cli")]
#[command(about = "Command-line chat and document upload")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    /// Config file path
    #[arg(long, env = "RAGCHAT_CONFIG")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a line-based chat session
    Chat,
    /// Upload one file to the endpoint
    Upload {
        /// File to upload
        file: PathBuf,
        /// Extra form field sent with the file (name=value), repeatable
        #[arg(long = "field", value_parser = repl::parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Configuration commands
    Config(ConfigArgs),
}

#[derive(Args, Clone)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Print one value (e.g. upload.url, chat.placeholder_answer)
    Get { key: String },
    /// Set one value and save
    Set { key: String, value: String },
    /// Write the default config
    Init {
        /// Overwrite an existing config
        #[arg(long, default_value = "false")]
        force: bool,
    },
    /// Print the whole config
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = ragchat_config::resolve_config_path(cli.config.as_deref())?;

    match cli.command {
        Commands::Config(args) => handle_config(args, &config_path).await,
        Commands::Chat => {
            let config = load_config(&config_path, cli.debug).await?;
            run_interactive_chat(&config).await
        }
        Commands::Upload { file, fields } => {
            let config = load_config(&config_path, cli.debug).await?;
            upload_once(&config, &file, fields).await
        }
    }
}

async fn load_config(path: &Path, debug: bool) -> anyhow::Result<Config> {
    let config = ConfigManager::load(path).await?.snapshot().await;

    let level = if debug { "debug" } else { config.logging.level.as_str() };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Config loaded from {:?}", path);
    Ok(config)
}

async fn handle_config(args: ConfigArgs, config_path: &Path) -> anyhow::Result<()> {
    match args.command {
        ConfigCommands::Get { key } => {
            let config = ConfigManager::load(config_path).await?.snapshot().await;

            match config.get_value(&key) {
                Some(value) => {
                    println!("{}", format!("{} = {}", key, value).green());
                }
                None => {
                    println!("{}", format!("❌ Key not found: {}", key).red());
                    std::process::exit(1);
                }
            }
        }
        ConfigCommands::Set { key, value } => {
            let manager = ConfigManager::load(config_path).await?;

            if let Err(e) = manager.update(|config| config.set_value(&key, &value)).await {
                eprintln!("{}", format!("❌ Failed to set value: {}", e).red());
                std::process::exit(1);
            }
            println!("{}", format!("✅ Set {} = {}", key, value).green());
        }
        ConfigCommands::Init { force } => {
            if config_path.exists() && !force {
                println!("{}", format!("⚠️  Config already exists at {:?}", config_path).yellow());
                println!("{}", "Use --force to overwrite".dimmed());
                return Ok(());
            }

            ragchat_config::init_ragchat_dirs().await?;

            let manager = ConfigManager::new(Config::default(), config_path.to_path_buf());
            manager.save().await?;

            println!("{}", format!("✅ Config initialized at {:?}", config_path).green());
        }
        ConfigCommands::Show => {
            let config = ConfigManager::load(config_path).await?.snapshot().await;

            println!("{}", "📋 Current Configuration:".cyan().bold());
            println!();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn new_controller(config: &Config) -> ChatController {
    ChatController::new(
        config.chat.initial_chat_title.as_str(),
        config.chat.placeholder_answer.as_str(),
    )
}

/// Select a file the way a file picker would: it has to exist
fn pick_file(raw: &Path) -> anyhow::Result<SelectedFile> {
    let path = ragchat_config::expand_tilde(&raw.to_string_lossy())
        .unwrap_or_else(|| raw.to_path_buf());
    if !path.is_file() {
        anyhow::bail!("No such file: {}", raw.display());
    }
    Ok(SelectedFile::from_path(path)?)
}

async fn upload_once(
    config: &Config,
    file: &Path,
    fields: Vec<(String, String)>,
) -> anyhow::Result<()> {
    let mut uploader = HttpUploader::from_config(&config.upload)?;
    for (name, value) in fields {
        uploader = uploader.with_field(name, value)?;
    }

    let mut controller = new_controller(config);
    controller.dispatch(ChatEvent::FileSelected(pick_file(file)?));

    println!("{}", format!("🚀 Uploading to {}", uploader.endpoint()).cyan());
    match controller.upload(&uploader).await {
        UploadOutcome::Uploaded { .. } => {
            for message in controller.store().messages() {
                print_message(message);
            }
            Ok(())
        }
        UploadOutcome::Failed { name, reason } => {
            println!("{}", format!("❌ Upload of {} failed: {}", name, reason).red());
            std::process::exit(1);
        }
        UploadOutcome::Skipped => Ok(()),
    }
}

fn print_message(message: &Message) {
    match message.kind {
        MessageKind::Question => println!("{} {}", "You:".cyan().bold(), message.content),
        MessageKind::Answer => println!("{} {}", "Assistant:".green().bold(), message.content),
        MessageKind::File => println!("{} {}", "📄 File:".yellow().bold(), message.content.yellow()),
    }
}

async fn run_interactive_chat(config: &Config) -> anyhow::Result<()> {
    let uploader = HttpUploader::from_config(&config.upload)?;
    let mut controller = new_controller(config);

    println!("{}", "🤖 RAG Chat".cyan().bold());
    println!("{}", format!("Upload endpoint: {}", uploader.endpoint()).dimmed());
    println!("{}", "Type /help for commands, 'exit' to leave".dimmed());
    println!();

    loop {
        print!("{} ", ">".cyan().bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);

        let before = controller.store().messages().len();
        match parse_line(line) {
            ChatCommand::Quit => {
                println!("{}", "👋 Goodbye!".cyan());
                break;
            }
            ChatCommand::Ask(text) => {
                controller.composer_mut().set_input(text);
                controller.dispatch(ChatEvent::Submit);
            }
            ChatCommand::SelectFile(raw) => match pick_file(Path::new(&raw)) {
                Ok(file) => {
                    println!("{}", format!("Selected {}", file.name()).dimmed());
                    controller.dispatch(ChatEvent::FileSelected(file));
                }
                Err(e) => println!("{}", format!("❌ {}", e).red()),
            },
            ChatCommand::Upload => {
                if controller.submitter().selected().is_none() {
                    println!("{}", "No file selected; use /file <path>".dimmed());
                } else {
                    // Failures are logged by the submitter; the file stays selected
                    controller.upload(&uploader).await;
                }
            }
            ChatCommand::History => {
                let active = controller.active_history();
                for (idx, summary) in controller.store().history().iter().enumerate() {
                    let marker = if active == Some(idx) { "●" } else { " " };
                    println!("{} {}. {}", marker.green(), idx + 1, summary.title);
                }
            }
            ChatCommand::Open(index) => {
                controller.dispatch(ChatEvent::HistorySelected(index));
            }
            ChatCommand::Transcript => {
                println!("{}", repl::transcript_json(controller.store())?);
            }
            ChatCommand::Help => println!("{}", repl::HELP),
            ChatCommand::Invalid(reason) => println!("{}", reason.red()),
        }

        for message in &controller.store().messages()[before..] {
            print_message(message);
        }
    }

    Ok(())
}
