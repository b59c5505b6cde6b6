//! 调用者身份解析
//!
//! 从调用中提取调用者，并在配置了创建策略时物化为后端主体。

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::invocation::Invocation;
use crate::utils::RouteError;

/// 用户创建策略
///
/// 把平台原始用户物化为后端主体。`Ok(None)` 表示策略没有返回主体，
/// `Err` 携带失败原因。路由器只调用一次，不重试。
#[async_trait]
pub trait CreationStrategy: Send + Sync {
    /// 物化主体
    async fn materialize(&self, caller: &Value) -> Result<Option<Value>, String>;
}

/// 已解析的调用者
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    /// 未配置创建策略时，直接使用平台原始用户
    Caller(Value),
    /// 创建策略返回的主体
    Principal(Value),
}

impl Actor {
    /// 内部数据
    pub fn value(&self) -> &Value {
        match self {
            Actor::Caller(v) | Actor::Principal(v) => v,
        }
    }

    /// 是否为物化后的主体
    pub fn is_principal(&self) -> bool {
        matches!(self, Actor::Principal(_))
    }

    /// 用于日志的类别名
    pub fn kind_str(&self) -> &'static str {
        match self {
            Actor::Caller(_) => "caller",
            Actor::Principal(_) => "principal",
        }
    }
}

/// 提取调用者：优先顶层 `user`，其次 `member.user`
pub fn extract_caller(invocation: &Invocation) -> Option<&Value> {
    invocation
        .user
        .as_ref()
        .filter(|u| u.is_object())
        .or_else(|| {
            invocation
                .member
                .as_ref()
                .and_then(|m| m.get("user"))
                .filter(|u| u.is_object())
        })
}

/// 解析调用者
///
/// # Errors
///
/// - 没有可提取的调用者：[`RouteError::AuthenticationRequired`]
/// - 创建策略返回 `None` 或错误：[`RouteError::UserResolutionFailed`]，保留原因
pub async fn resolve_actor(
    invocation: &Invocation,
    strategy: Option<&dyn CreationStrategy>,
) -> Result<Actor, RouteError> {
    let caller = extract_caller(invocation).ok_or(RouteError::AuthenticationRequired)?;

    let Some(strategy) = strategy else {
        return Ok(Actor::Caller(caller.clone()));
    };

    match strategy.materialize(caller).await {
        Ok(Some(principal)) => {
            debug!(invocation_id = %invocation.id, "调用者已物化为主体");
            Ok(Actor::Principal(principal))
        }
        Ok(None) => {
            warn!(invocation_id = %invocation.id, "创建策略未返回主体");
            Err(RouteError::UserResolutionFailed("no principal returned".to_string()))
        }
        Err(reason) => {
            warn!(invocation_id = %invocation.id, reason = %reason, "创建策略失败");
            Err(RouteError::UserResolutionFailed(reason))
        }
    }
}
