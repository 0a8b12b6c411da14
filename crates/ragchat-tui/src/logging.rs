//! File logging for the terminal UI.
//!
//! The terminal belongs to the UI while it runs, so log output goes to the
//! configured file only.

use std::path::{Path, PathBuf};

use anyhow::Context;
use ragchat_config::{LogLevel, LoggingConfig};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter from `RUST_LOG`, falling back to the configured level
pub fn build_filter(level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Install the file subscriber.
///
/// Returns `None` when no log file is configured; logging is then disabled.
/// The returned guard must be held until exit so buffered lines are flushed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let Some(file) = config.file.as_deref() else {
        return Ok(None);
    };

    let (dir, file_name) = split_log_path(file)?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {:?}", dir))?;

    let appender = tracing_appender::rolling::never(&dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(build_filter(config.level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::info!("Logging to {} at level {}", file, config.level);
    Ok(Some(guard))
}

fn split_log_path(file: &str) -> anyhow::Result<(PathBuf, String)> {
    let path = ragchat_config::expand_tilde(file)
        .with_context(|| format!("Cannot resolve log file path {}", file))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Log file path has no file name: {}", file))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };
    Ok((dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_log_path() {
        let (dir, name) = split_log_path("/var/log/ragchat/ragchat.log").unwrap();
        assert_eq!(dir, PathBuf::from("/var/log/ragchat"));
        assert_eq!(name, "ragchat.log");

        let (dir, name) = split_log_path("ragchat.log").unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "ragchat.log");

        assert!(split_log_path("/").is_err());
    }

    #[test]
    fn test_no_file_disables_logging() {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            file: None,
        };
        assert!(init(&config).unwrap().is_none());
    }
}
