use crate::config::{Config, ConfigError, ConfigResult};
use ragchat_core::FILE_FIELD;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;
use tracing::info;

/// 配置管理器
#[derive(Clone)]
pub struct ConfigManager {
    path: PathBuf,
    config: Arc<RwLock<Config>>,
}

impl ConfigManager {
    /// 加载配置文件，不存在时写入默认配置
    pub async fn load(path: &Path) -> ConfigResult<Self> {
        let config = if path.exists() {
            info!("Loading config from {:?}", path);
            let content = tokio::fs::read_to_string(path).await?;
            let content = Self::expand_env_vars(&content)?;
            let config: Config = serde_json::from_str(&content)?;
            Self::validate(&config)?;
            config
        } else {
            info!("Config file not found, creating default config at {:?}", path);
            let default_config = Config::default();
            // 确保父目录存在
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let content = serde_json::to_string_pretty(&default_config)?;
            tokio::fs::write(path, &content).await?;
            default_config
        };

        Ok(Self {
            path: path.to_path_buf(),
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 从默认位置加载配置
    pub async fn load_default() -> ConfigResult<Self> {
        let config_path = crate::resolve_config_path(None)?;
        Self::load(&config_path).await
    }

    /// 创建一个新的配置管理器（不读取文件）
    pub fn new(config: Config, path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// 获取配置的共享引用
    pub fn get(&self) -> Arc<RwLock<Config>> {
        Arc::clone(&self.config)
    }

    /// 获取当前配置的副本
    pub async fn snapshot(&self) -> Config {
        self.config.read().await.clone()
    }

    /// 保存配置到文件
    pub async fn save(&self) -> ConfigResult<()> {
        let config = self.config.read().await;
        let content = serde_json::to_string_pretty(&*config)?;
        drop(config);

        // 确保父目录存在
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&self.path, content).await?;
        info!("Config saved to {:?}", self.path);
        Ok(())
    }

    /// 更新配置并保存；更新后的配置未通过验证时不写入
    pub async fn update<F>(&self, f: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config) -> ConfigResult<()>,
    {
        let mut config = self.config.write().await;
        let mut updated = config.clone();
        f(&mut updated)?;
        Self::validate(&updated)?;
        *config = updated;
        drop(config);
        self.save().await
    }

    /// 验证配置
    pub fn validate(config: &Config) -> ConfigResult<()> {
        if config.upload.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Upload host cannot be empty".to_string(),
            ));
        }

        if config.upload.port == 0 {
            return Err(ConfigError::Validation(
                "Upload port cannot be 0".to_string(),
            ));
        }

        if !config.upload.path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "Upload path must start with '/': {}",
                config.upload.path
            )));
        }

        if config.upload.timeout_seconds == Some(0) {
            return Err(ConfigError::Validation(
                "Upload timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if config.upload.extra_fields.contains_key(FILE_FIELD) {
            return Err(ConfigError::Validation(format!(
                "Extra form field '{}' would shadow the uploaded file",
                FILE_FIELD
            )));
        }

        if config.chat.placeholder_answer.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Chat placeholder_answer cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// 展开环境变量 ${VAR} 或 ${VAR:-default}
    fn expand_env_vars(content: &str) -> ConfigResult<String> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| {
            Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid")
        });

        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let full_match = &cap[0];
            let var_expr = &cap[1];

            // 处理 ${VAR:-default} 语法
            let (var_name, default_value) = match var_expr.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (var_expr, None),
            };

            let replacement = match std::env::var(var_name) {
                Ok(val) => val,
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    None => return Err(ConfigError::EnvVarNotFound(var_name.to_string())),
                },
            };

            result = result.replace(full_match, &replacement);
        }

        Ok(result)
    }

    /// 获取配置文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_creates_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.json");

        let manager = ConfigManager::load(&config_path).await.unwrap();
        let config = manager.snapshot().await;

        assert!(config_path.exists());
        assert_eq!(config.upload.port, 7071);
        assert_eq!(config.upload.host, "localhost");
    }

    #[tokio::test]
    async fn test_update_persists_and_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let manager = ConfigManager::load(&config_path).await.unwrap();
        manager
            .update(|config| config.set_value("upload.host", "rag.example"))
            .await
            .unwrap();

        let reloaded = ConfigManager::load(&config_path).await.unwrap();
        assert_eq!(reloaded.snapshot().await.upload.host, "rag.example");
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_result() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let manager = ConfigManager::load(&config_path).await.unwrap();

        let result = manager
            .update(|config| config.set_value("upload.path", "api/upload"))
            .await;
        assert!(matches!(result, Err(ConfigError::Validation(_))));
        assert_eq!(manager.snapshot().await.upload.path, "/api/upload");
    }

    #[tokio::test]
    async fn test_load_expands_env_vars() {
        std::env::set_var("RAGCHAT_TEST_UPLOAD_HOST", "from-env");

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let mut config = serde_json::to_value(Config::default()).unwrap();
        config["upload"]["host"] = serde_json::json!("${RAGCHAT_TEST_UPLOAD_HOST}");
        config["chat"]["initial_chat_title"] = serde_json::json!("${RAGCHAT_TEST_UNSET_TITLE:-Inbox}");
        tokio::fs::write(&config_path, config.to_string()).await.unwrap();

        let manager = ConfigManager::load(&config_path).await.unwrap();
        let loaded = manager.snapshot().await;
        assert_eq!(loaded.upload.host, "from-env");
        assert_eq!(loaded.chat.initial_chat_title, "Inbox");
    }

    #[test]
    fn test_missing_env_var_is_error() {
        let result = ConfigManager::expand_env_vars(r#"{"key": "${RAGCHAT_TEST_DEFINITELY_UNSET}"}"#);
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound(_))));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(ConfigManager::validate(&config).is_ok());

        config.upload.port = 0;
        assert!(ConfigManager::validate(&config).is_err());

        config.upload.port = 7071;
        config.upload.extra_fields.insert("file".to_string(), "x".to_string());
        assert!(ConfigManager::validate(&config).is_err());
    }
}
