//! 事件回调配置
//!
//! 决定事件消费层应当处理哪些网关事件：
//! - 事件目录（分类与预设档位）
//! - 回调配置记录
//! - 配置诊断
//! - 解析器

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod resolver;

pub use catalog::{
    expand_categories, normalize_event_name, CallbackCategory, CallbackProfile, CATEGORIES,
    CORE_EVENTS, CUSTOM_PROFILE, PROFILES,
};
pub use config::CallbackConfig;
pub use diagnostics::{ConfigDiagnostic, ConfigurationError, DiagnosticCode};
pub use resolver::{resolve, validate, ResolvedCallbackConfig};
