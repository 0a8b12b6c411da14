pub mod config;
pub mod manager;

pub use config::{
    ChatConfig, Config, ConfigError, ConfigResult, LogLevel, LoggingConfig, UploadConfig,
};
pub use manager::ConfigManager;

use std::path::PathBuf;

/// 配置文件路径的环境变量
pub const CONFIG_ENV_VAR: &str = "RAGCHAT_CONFIG";

/// 获取 ragchat 配置目录路径
pub fn ragchat_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ragchat"))
}

/// 获取默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    ragchat_dir().map(|dir| dir.join("config.json"))
}

/// 初始化 ragchat 目录结构
pub async fn init_ragchat_dirs() -> ConfigResult<()> {
    if let Some(root) = ragchat_dir() {
        tokio::fs::create_dir_all(&root).await?;
        tokio::fs::create_dir_all(root.join("logs")).await?;
    }
    Ok(())
}

/// 展开路径中的 ~ 为用户主目录
pub fn expand_tilde(path: &str) -> Option<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir().map(|home| home.join(rest))
    } else {
        Some(PathBuf::from(path))
    }
}

/// 解析配置文件路径：显式参数 > 环境变量 > 默认位置
pub fn resolve_config_path(explicit: Option<&str>) -> ConfigResult<PathBuf> {
    let raw = match explicit {
        Some(path) => path.to_string(),
        None => match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) => path,
            Err(_) => {
                return default_config_path().ok_or_else(|| {
                    ConfigError::InvalidPath("Could not find home directory".to_string())
                })
            }
        },
    };

    expand_tilde(&raw).ok_or_else(|| ConfigError::InvalidPath(raw))
}
