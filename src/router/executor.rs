//! 后端操作执行
//!
//! 按操作类型分发到注入的后端执行器。每次执行只调用后端一次，
//! 不重试、不排队；围绕调用测量耗时，仅用于观测。

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

use super::actor::Actor;
use super::command::{Command, OperationKind, OperationRef};
use super::input::InputMap;
use super::invocation::InvocationContext;
use crate::utils::ErrorKind;

/// 字段错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// 缺少必填字段
    Required,
    /// 字段值无效
    Invalid,
}

/// 单个字段的校验错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// 字段名
    pub field: String,
    /// 错误类型
    pub kind: FieldErrorKind,
    /// 详情
    pub detail: String,
}

impl FieldError {
    /// 缺少必填字段
    pub fn required(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::Required,
            detail: String::new(),
        }
    }

    /// 字段值无效
    pub fn invalid(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: FieldErrorKind::Invalid,
            detail: detail.into(),
        }
    }

    /// 面向用户的消息
    pub fn user_message(&self) -> String {
        match self.kind {
            FieldErrorKind::Required => format!("{} is required", self.field),
            FieldErrorKind::Invalid => format!("{}: {}", self.field, self.detail),
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::user_message)
        .collect::<Vec<_>>()
        .join("; ")
}

/// 后端返回的错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// 输入校验失败
    #[error("输入校验失败: {}", join_field_errors(.errors))]
    Invalid {
        /// 字段错误
        errors: Vec<FieldError>,
    },

    /// 权限不足
    #[error("权限不足: {reason}")]
    Forbidden {
        /// 原因
        reason: String,
    },

    /// 其他错误，`kind` 为后端自己的错误类别名
    #[error("{kind}: {message}")]
    Other {
        /// 错误类别名
        kind: String,
        /// 错误信息
        message: String,
    },
}

impl BackendError {
    /// 输入校验失败
    pub fn invalid(errors: Vec<FieldError>) -> Self {
        BackendError::Invalid { errors }
    }

    /// 权限不足
    pub fn forbidden(reason: impl Into<String>) -> Self {
        BackendError::Forbidden {
            reason: reason.into(),
        }
    }

    /// 其他错误
    pub fn other(kind: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Other {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// 错误类别名中是否带有“未找到”标记
    pub fn is_not_found(&self) -> bool {
        match self {
            BackendError::Other { kind, .. } => {
                let kind = kind.to_lowercase();
                kind.contains("notfound") || kind.contains("not_found")
            }
            _ => false,
        }
    }

    /// 错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Invalid { .. } => ErrorKind::Validation,
            BackendError::Forbidden { .. } => ErrorKind::Forbidden,
            other if other.is_not_found() => ErrorKind::NotFound,
            BackendError::Other { .. } => ErrorKind::UnknownBackend,
        }
    }
}

/// 后端操作执行器
///
/// 由后端实现；路由器等待其完成，没有超时与取消。
#[async_trait]
pub trait BackendRunner: Send + Sync {
    /// 执行操作
    async fn run(
        &self,
        kind: OperationKind,
        operation: &OperationRef,
        input: InputMap,
        actor: &Actor,
        context: &InvocationContext,
    ) -> Result<Value, BackendError>;
}

/// 执行错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// 操作类型尚未支持
    #[error("不支持的操作类型: {0}")]
    UnsupportedOperationKind(OperationKind),

    /// 后端返回错误
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// 执行结果
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// 后端返回值（创建为记录，读取为集合，通用动作原样透传）
    pub value: Value,
    /// 后端调用耗时
    pub elapsed: Duration,
}

/// 操作执行器
#[derive(Clone)]
pub struct ActionExecutor {
    backend: Arc<dyn BackendRunner>,
}

impl ActionExecutor {
    /// 创建执行器
    pub fn new(backend: Arc<dyn BackendRunner>) -> Self {
        Self { backend }
    }

    /// 执行命令对应的后端操作
    ///
    /// 更新与删除直接返回 [`ExecutionError::UnsupportedOperationKind`]，不会触达后端。
    pub async fn execute(
        &self,
        command: &Command,
        input: InputMap,
        actor: &Actor,
        context: &InvocationContext,
    ) -> Result<Execution, ExecutionError> {
        if !command.kind.is_supported() {
            return Err(ExecutionError::UnsupportedOperationKind(command.kind));
        }

        let start = Instant::now();
        let result = self
            .backend
            .run(command.kind, &command.operation, input, actor, context)
            .await;
        let elapsed = start.elapsed();

        debug!(
            command = %command.name,
            operation = %command.operation,
            kind = %command.kind,
            success = result.is_ok(),
            elapsed_us = elapsed.as_micros() as u64,
            "后端操作完成"
        );

        Ok(Execution {
            value: result?,
            elapsed,
        })
    }
}
