use ragchat_core::DEFAULT_PLACEHOLDER_ANSWER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 主配置结构体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,
    pub upload: UploadConfig,
    pub chat: ChatConfig,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            upload: UploadConfig::default(),
            chat: ChatConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// 获取配置值的快捷方法
    pub fn get_value(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["version"] => Some(self.version.clone()),
            ["upload", "host"] => Some(self.upload.host.clone()),
            ["upload", "port"] => Some(self.upload.port.to_string()),
            ["upload", "path"] => Some(self.upload.path.clone()),
            ["upload", "url"] => Some(self.upload.url()),
            ["upload", "timeout_seconds"] => self.upload.timeout_seconds.map(|t| t.to_string()),
            ["upload", "extra_fields", name] => self.upload.extra_fields.get(*name).cloned(),
            ["chat", "initial_chat_title"] => Some(self.chat.initial_chat_title.clone()),
            ["chat", "placeholder_answer"] => Some(self.chat.placeholder_answer.clone()),
            ["logging", "level"] => Some(self.logging.level.to_string()),
            ["logging", "file"] => self.logging.file.clone(),
            _ => None,
        }
    }

    /// 设置配置值
    pub fn set_value(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["upload", "host"] => {
                self.upload.host = value.to_string();
            }
            ["upload", "port"] => {
                self.upload.port = value.parse().map_err(|_| {
                    ConfigError::Validation(format!("Invalid port number: {}", value))
                })?;
            }
            ["upload", "path"] => {
                self.upload.path = value.to_string();
            }
            ["upload", "timeout_seconds"] => {
                self.upload.timeout_seconds = match value {
                    "" | "none" => None,
                    _ => Some(value.parse().map_err(|_| {
                        ConfigError::Validation(format!("Invalid number: {}", value))
                    })?),
                };
            }
            ["upload", "extra_fields", name] => {
                self.upload
                    .extra_fields
                    .insert(name.to_string(), value.to_string());
            }
            ["chat", "initial_chat_title"] => {
                self.chat.initial_chat_title = value.to_string();
            }
            ["chat", "placeholder_answer"] => {
                self.chat.placeholder_answer = value.to_string();
            }
            ["logging", "level"] => {
                self.logging.level = value.parse()?;
            }
            ["logging", "file"] => {
                self.logging.file = Some(value.to_string());
            }
            _ => return Err(ConfigError::KeyNotFound(key.to_string())),
        }
        Ok(())
    }
}

/// Upload endpoint 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// 请求超时（秒），未设置时不限制
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    /// 随文件一起提交的额外表单字段 (e.g. `file_type`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_fields: BTreeMap<String, String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 7071,
            path: "/api/upload".to_string(),
            timeout_seconds: None,
            extra_fields: BTreeMap::new(),
        }
    }
}

impl UploadConfig {
    /// 完整的上传地址
    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.path)
    }
}

/// Chat 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatConfig {
    /// 会话创建时历史列表中的第一条标题
    pub initial_chat_title: String,
    /// 每个问题之后追加的占位回答
    pub placeholder_answer: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            initial_chat_title: "New chat".to_string(),
            placeholder_answer: DEFAULT_PLACEHOLDER_ANSWER.to_string(),
        }
    }
}

/// 日志级别
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::Validation(format!("Invalid log level: {}", s))),
        }
    }
}

/// Logging 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// 日志文件；终端界面运行时日志只写入文件
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: Some("~/.ragchat/logs/ragchat.log".to_string()),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
