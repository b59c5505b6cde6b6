//! # Chips Interaction - 薯片交互核心
//!
//! 聊天平台机器人的斜杠命令路由核心，提供以下功能：
//!
//! - **命令路由**: 查找命令、解析调用者、构建后端输入、执行操作、格式化响应
//! - **错误翻译**: 把后端错误归一为固定分类，生成简短的用户消息
//! - **回调配置**: 由档位与分类覆盖计算需要处理的网关事件集合
//! - **事件闸门**: 按回调配置过滤网关事件，把斜杠命令交给路由器
//! - **配置与日志**: YAML/JSON 应用配置、基于 tracing 的结构化日志
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chips_interaction::{AppConfig, InMemoryRegistry, Router};
//! # use chips_interaction::router::{BackendRunner, Sender};
//!
//! # async fn demo(backend: Arc<dyn BackendRunner>, sender: Arc<dyn Sender>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_file("config.yaml").await?;
//! let callbacks = config.resolve_callbacks()?;
//!
//! let registry = Arc::new(InMemoryRegistry::from_commands(vec![])?);
//! let router = Router::builder(registry, backend, sender)
//!     .callback_options(&callbacks)
//!     .build();
//! # let _ = router;
//! # Ok(())
//! # }
//! ```
//!
//! ## 模块结构
//!
//! - `router` - 命令路由相关类型
//! - `callbacks` - 事件回调配置
//! - `core` - 应用配置
//! - `utils` - 错误类型与日志

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod callbacks;
pub mod core;
pub mod router;
pub mod utils;

// 重导出常用类型，方便使用
pub use router::{
    ActionExecutor, Actor, BackendError, BackendRunner, Command, CommandOption, CommandRegistry,
    CreationStrategy, DefaultFormatter, Envelope, EventGate, FieldError, GateOutcome,
    GatewayEvent, InMemoryRegistry, Invocation, InvocationContext, OperationKind, OperationRef,
    OptionType, RawOption, ResponseFormatter, Router, RouterBuilder, Scope, Sender,
};

pub use callbacks::{
    resolve, validate, CallbackConfig, ConfigDiagnostic, ConfigurationError,
    ResolvedCallbackConfig,
};

pub use utils::{error_code, CoreError, ErrorKind, Result, RouteError};
pub use utils::logger::{LogGuard, Logger, LoggerConfig, LoggerConfigBuilder, RotationStrategy};

pub use core::config::{AppConfig, AppConfigBuilder, Environment, LogConfig};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
