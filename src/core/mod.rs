//! 核心模块
//!
//! 包含应用配置与部署环境。

pub mod config;

pub use config::{AppConfig, AppConfigBuilder, Environment, LogConfig};
