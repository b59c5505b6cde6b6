//! 应用配置
//!
//! 定义配置文件结构（YAML 或 JSON）和加载逻辑。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::warn;

use crate::callbacks::{resolve, CallbackConfig, ConfigurationError, ResolvedCallbackConfig};

/// 部署环境变量名
pub const ENVIRONMENT_VAR: &str = "CHIPS_ENV";

/// 部署环境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// 开发环境（默认）
    #[default]
    Development,
    /// 测试环境
    Test,
    /// 生产环境
    Production,
}

impl Environment {
    /// 从字符串解析，无法识别时返回 `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Some(Environment::Development),
            "test" | "testing" => Some(Environment::Test),
            "prod" | "production" => Some(Environment::Production),
            _ => None,
        }
    }

    /// 从环境变量读取
    pub fn from_env() -> Option<Self> {
        std::env::var(ENVIRONMENT_VAR).ok().and_then(|v| Self::parse(&v))
    }

    /// 该环境下未显式指定档位时使用的档位
    pub fn default_profile(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "minimal",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出到文件
    #[serde(default)]
    pub file_output: bool,

    /// 日志文件目录
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json_format: bool,

    /// 日志轮转策略
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: false,
            log_dir: None,
            json_format: false,
            rotation: default_rotation(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 配置文件路径
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// 部署环境（缺省时读取 `CHIPS_ENV`）
    #[serde(default)]
    pub environment: Option<String>,

    /// 日志配置
    #[serde(default)]
    pub logging: LogConfig,

    /// 回调配置（松散映射，解析时统一校验）
    #[serde(default)]
    pub callbacks: Value,
}

impl AppConfig {
    /// 创建配置构建器
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::new()
    }

    /// 从文件加载配置
    ///
    /// `.json` 后缀按 JSON 解析，其余按 YAML 解析。
    pub async fn from_file(path: impl Into<PathBuf>) -> crate::utils::Result<Self> {
        let path = path.into();
        let content = tokio::fs::read_to_string(&path).await?;

        let mut config: AppConfig = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        config.config_path = Some(path);
        Ok(config)
    }

    /// 当前部署环境
    ///
    /// 优先级：配置文件 > `CHIPS_ENV` > development。
    pub fn environment(&self) -> Environment {
        if let Some(ref raw) = self.environment {
            match Environment::parse(raw) {
                Some(env) => return env,
                None => warn!(environment = %raw, "无法识别的部署环境，回退到环境变量"),
            }
        }
        Environment::from_env().unwrap_or_default()
    }

    /// 解析回调配置
    pub fn resolve_callbacks(&self) -> Result<ResolvedCallbackConfig, ConfigurationError> {
        let callbacks = CallbackConfig::from_value(&self.callbacks)?;
        resolve(&callbacks, self.environment())
    }
}

/// 配置构建器
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置部署环境
    pub fn environment(mut self, env: Environment) -> Self {
        self.config.environment = Some(env.to_string());
        self
    }

    /// 设置日志级别
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// 启用文件日志
    pub fn file_logging(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.config.logging.file_output = true;
        self.config.logging.log_dir = Some(log_dir.into());
        self
    }

    /// 启用 JSON 格式日志
    pub fn json_logging(mut self) -> Self {
        self.config.logging.json_format = true;
        self
    }

    /// 设置回调配置
    pub fn callbacks(mut self, callbacks: Value) -> Self {
        self.config.callbacks = callbacks;
        self
    }

    /// 构建配置
    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(config.callbacks.is_null());
    }

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("prod"), Some(Environment::Production));
        assert_eq!(Environment::parse(" Test "), Some(Environment::Test));
        assert_eq!(Environment::parse("staging"), None);
    }

    #[test]
    fn test_explicit_environment_wins() {
        let config = AppConfig::builder().environment(Environment::Test).build();
        assert_eq!(config.environment(), Environment::Test);
    }

    #[test]
    fn test_config_builder() {
        let config = AppConfig::builder()
            .log_level("debug")
            .json_logging()
            .callbacks(json!({ "profile": "minimal" }))
            .build();

        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
        assert_eq!(config.callbacks["profile"], "minimal");
    }

    #[test]
    fn test_resolve_callbacks() {
        let config = AppConfig::builder()
            .environment(Environment::Production)
            .callbacks(json!({ "disableCallbacks": ["typingStart"] }))
            .build();

        let resolved = config.resolve_callbacks().unwrap();
        assert_eq!(resolved.profile, "production");
        assert!(!resolved.is_enabled("typingStart"));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::builder()
            .environment(Environment::Production)
            .log_level("warn")
            .callbacks(json!({ "profile": "full", "storeBotMessages": true }))
            .build();

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed.logging.level, "warn");
        assert_eq!(parsed.environment(), Environment::Production);
        assert_eq!(parsed.callbacks["storeBotMessages"], true);
    }
}
