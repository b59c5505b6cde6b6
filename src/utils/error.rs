//! 错误类型定义
//!
//! 本模块定义了路由核心使用的错误类型：
//!
//! - [`CoreError`]：基础设施错误（IO、配置文件解析、命令表构建、初始化等）
//! - [`RouteError`]：单次命令路由过程中可能出现的错误，最终都会被转换为响应信封
//! - [`ErrorKind`]：对外暴露的固定错误分类

use thiserror::Error;

use crate::callbacks::ConfigurationError;
use crate::router::command::OperationKind;
use crate::router::executor::{BackendError, ExecutionError};

/// 核心基础设施错误
#[derive(Error, Debug)]
pub enum CoreError {
    // ==================== 命令表错误 ====================

    /// 命令定义无效
    #[error("命令定义无效: {0}")]
    InvalidCommand(String),

    /// 命令重复注册
    #[error("命令重复注册: '{0}'")]
    DuplicateCommand(String),

    // ==================== 交互解析错误 ====================

    /// 交互载荷无效
    #[error("交互载荷无效: {0}")]
    InvalidInteraction(String),

    /// 响应发送失败
    #[error("响应发送失败: {0}")]
    SendFailed(String),

    // ==================== 配置错误 ====================

    /// 回调配置错误
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// 配置加载失败
    #[error("配置加载失败: {0}")]
    ConfigLoadFailed(String),

    // ==================== IO 和序列化错误 ====================

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化/反序列化错误
    #[error("JSON 错误: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML 序列化/反序列化错误
    #[error("YAML 错误: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ==================== 通用错误 ====================

    /// 初始化失败
    #[error("初始化失败: {0}")]
    InitFailed(String),
}

/// 核心操作结果类型别名
pub type Result<T> = std::result::Result<T, CoreError>;

/// 固定的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 命令未注册
    UnknownCommand,
    /// 无法识别调用者
    AuthenticationRequired,
    /// 调用者身份物化失败
    UserResolutionFailed,
    /// 操作类型尚未支持
    UnsupportedOperationKind,
    /// 斜杠命令交互无法解析
    MalformedInvocation,
    /// 输入校验失败
    Validation,
    /// 权限不足
    Forbidden,
    /// 资源不存在
    NotFound,
    /// 未分类的后端错误
    UnknownBackend,
}

impl ErrorKind {
    /// 所有分类，按声明顺序
    pub const ALL: [ErrorKind; 9] = [
        ErrorKind::UnknownCommand,
        ErrorKind::AuthenticationRequired,
        ErrorKind::UserResolutionFailed,
        ErrorKind::UnsupportedOperationKind,
        ErrorKind::MalformedInvocation,
        ErrorKind::Validation,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::UnknownBackend,
    ];

    /// 在 [`ErrorKind::ALL`] 中的下标
    pub fn index(self) -> usize {
        self as usize
    }

    /// 获取错误码
    pub fn error_code(self) -> &'static str {
        match self {
            ErrorKind::UnknownCommand => error_code::ROUTE_UNKNOWN_COMMAND,
            ErrorKind::AuthenticationRequired => error_code::AUTH_REQUIRED,
            ErrorKind::UserResolutionFailed => error_code::AUTH_USER_RESOLUTION,
            ErrorKind::UnsupportedOperationKind => error_code::ROUTE_UNSUPPORTED_KIND,
            ErrorKind::MalformedInvocation => error_code::ROUTE_MALFORMED_INVOCATION,
            ErrorKind::Validation => error_code::BACKEND_VALIDATION,
            ErrorKind::Forbidden => error_code::BACKEND_FORBIDDEN,
            ErrorKind::NotFound => error_code::BACKEND_NOT_FOUND,
            ErrorKind::UnknownBackend => error_code::BACKEND_UNKNOWN,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::UnknownCommand => "unknown_command",
            ErrorKind::AuthenticationRequired => "authentication_required",
            ErrorKind::UserResolutionFailed => "user_resolution_failed",
            ErrorKind::UnsupportedOperationKind => "unsupported_operation_kind",
            ErrorKind::MalformedInvocation => "malformed_invocation",
            ErrorKind::Validation => "validation",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UnknownBackend => "unknown_backend",
        };
        f.write_str(name)
    }
}

/// 单次路由错误
///
/// 路由器的公共接口从不向外抛出此错误，而是将其翻译为错误响应信封。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouteError {
    /// 命令未注册
    #[error("命令未注册: '{0}'")]
    UnknownCommand(String),

    /// 交互中没有可提取的调用者信息
    #[error("交互中缺少调用者信息")]
    AuthenticationRequired,

    /// 用户创建策略未能返回主体
    #[error("调用者身份解析失败: {0}")]
    UserResolutionFailed(String),

    /// 操作类型尚未支持
    #[error("不支持的操作类型: {0}")]
    UnsupportedOperationKind(OperationKind),

    /// 交互载荷带有 id 和 token，但无法解析为调用
    #[error("交互载荷无法解析: {0}")]
    MalformedInvocation(String),

    /// 后端操作返回错误
    #[error("后端操作失败: {0}")]
    Backend(BackendError),
}

impl RouteError {
    /// 错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            RouteError::UnknownCommand(_) => ErrorKind::UnknownCommand,
            RouteError::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            RouteError::UserResolutionFailed(_) => ErrorKind::UserResolutionFailed,
            RouteError::UnsupportedOperationKind(_) => ErrorKind::UnsupportedOperationKind,
            RouteError::MalformedInvocation(_) => ErrorKind::MalformedInvocation,
            RouteError::Backend(err) => err.kind(),
        }
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        self.kind().error_code()
    }
}

impl From<ExecutionError> for RouteError {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::UnsupportedOperationKind(kind) => {
                RouteError::UnsupportedOperationKind(kind)
            }
            ExecutionError::Backend(err) => RouteError::Backend(err),
        }
    }
}

/// 错误码常量
pub mod error_code {
    // 路由错误 (ROUTE-xxx)
    pub const ROUTE_UNKNOWN_COMMAND: &str = "ROUTE-001";
    pub const ROUTE_UNSUPPORTED_KIND: &str = "ROUTE-002";
    pub const ROUTE_MALFORMED_INVOCATION: &str = "ROUTE-003";

    // 身份错误 (AUTH-xxx)
    pub const AUTH_REQUIRED: &str = "AUTH-001";
    pub const AUTH_USER_RESOLUTION: &str = "AUTH-002";

    // 后端错误 (BACKEND-xxx)
    pub const BACKEND_VALIDATION: &str = "BACKEND-001";
    pub const BACKEND_FORBIDDEN: &str = "BACKEND-002";
    pub const BACKEND_NOT_FOUND: &str = "BACKEND-003";
    pub const BACKEND_UNKNOWN: &str = "BACKEND-004";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::executor::FieldError;

    #[test]
    fn test_error_display() {
        let err = RouteError::UnknownCommand("echo".to_string());
        assert!(err.to_string().contains("echo"));
    }

    #[test]
    fn test_error_code() {
        let err = RouteError::UnknownCommand("echo".to_string());
        assert_eq!(err.error_code(), error_code::ROUTE_UNKNOWN_COMMAND);

        let err = RouteError::Backend(BackendError::invalid(vec![FieldError::required("name")]));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.error_code(), error_code::BACKEND_VALIDATION);
    }

    #[test]
    fn test_execution_error_conversion() {
        let err: RouteError =
            ExecutionError::UnsupportedOperationKind(OperationKind::Destroy).into();
        assert_eq!(err, RouteError::UnsupportedOperationKind(OperationKind::Destroy));
    }

    #[test]
    fn test_malformed_invocation_kind() {
        let err = RouteError::MalformedInvocation("bad option".to_string());
        assert_eq!(err.kind(), ErrorKind::MalformedInvocation);
        assert_eq!(err.error_code(), error_code::ROUTE_MALFORMED_INVOCATION);
        assert!(err.to_string().contains("bad option"));
    }

    #[test]
    fn test_kind_index_matches_all() {
        for (i, kind) in ErrorKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
    }
}
