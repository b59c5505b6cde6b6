//! 错误翻译
//!
//! 把路由错误归一为固定分类，并生成面向用户和面向开发者的两条消息。
//! 用户消息简短、不暴露实现细节；开发者消息只写入日志。

use serde::Serialize;

use super::executor::{BackendError, FieldError};
use crate::utils::{ErrorKind, RouteError};

/// 命令执行失败（未知命令、不支持的操作类型、无法解析的交互）
pub const MSG_COMMAND_FAILED: &str = "Command failed to execute";
/// 需要登录
pub const MSG_AUTHENTICATION_REQUIRED: &str = "You must be signed in to use this command";
/// 账号解析失败
pub const MSG_USER_RESOLUTION_FAILED: &str = "We couldn't resolve your account";
/// 权限不足
pub const MSG_FORBIDDEN: &str = "You don't have permission to perform this action";
/// 资源不存在
pub const MSG_NOT_FOUND: &str = "The requested resource was not found";
/// 未分类错误
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred";

/// 已翻译的错误
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslatedError {
    /// 面向用户的消息
    pub user_message: String,
    /// 面向开发者的消息（仅日志）
    #[serde(skip)]
    pub developer_message: String,
    /// 错误分类
    pub kind: ErrorKind,
}

/// 校验错误的用户消息
///
/// 单个错误直接给出字段消息，多个错误合并为一行。
pub fn validation_message(errors: &[FieldError]) -> String {
    match errors {
        [] => MSG_UNEXPECTED.to_string(),
        [single] => single.user_message(),
        many => format!(
            "Multiple validation errors: {}",
            many.iter()
                .map(FieldError::user_message)
                .collect::<Vec<_>>()
                .join("; ")
        ),
    }
}

/// 翻译路由错误
pub fn translate(error: &RouteError) -> TranslatedError {
    let user_message = match error {
        RouteError::UnknownCommand(_)
        | RouteError::UnsupportedOperationKind(_)
        | RouteError::MalformedInvocation(_) => MSG_COMMAND_FAILED.to_string(),
        RouteError::AuthenticationRequired => MSG_AUTHENTICATION_REQUIRED.to_string(),
        RouteError::UserResolutionFailed(_) => MSG_USER_RESOLUTION_FAILED.to_string(),
        RouteError::Backend(err) => backend_message(err),
    };

    TranslatedError {
        user_message,
        developer_message: error.to_string(),
        kind: error.kind(),
    }
}

fn backend_message(error: &BackendError) -> String {
    match error {
        BackendError::Invalid { errors } => validation_message(errors),
        BackendError::Forbidden { .. } => MSG_FORBIDDEN.to_string(),
        other if other.is_not_found() => MSG_NOT_FOUND.to_string(),
        BackendError::Other { .. } => MSG_UNEXPECTED.to_string(),
    }
}
