//! 网关事件闸门
//!
//! 持有启动时解析好的回调配置，决定每个网关事件是被丢弃、
//! 放行给下游消费者，还是作为斜杠命令交给路由器。

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::invocation::{Invocation, INTERACTION_APPLICATION_COMMAND};
use super::response::Envelope;
use super::router::Router;
use crate::callbacks::{normalize_event_name, ResolvedCallbackConfig};
use crate::utils::RouteError;

/// 交互事件名
pub const INTERACTION_CREATE: &str = "interactionCreate";

/// 会携带消息作者的事件
const MESSAGE_EVENTS: &[&str] = &["messageCreate", "messageUpdate"];

/// 网关事件
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayEvent {
    /// 规范化后的事件名
    pub name: String,
    /// 事件数据
    pub data: Value,
    /// 接收时间
    pub received_at: DateTime<Utc>,
}

impl GatewayEvent {
    /// 创建事件，事件名会被规范化（`MESSAGE_CREATE` → `messageCreate`）
    pub fn new(name: &str, data: Value) -> Self {
        Self {
            name: normalize_event_name(name),
            data,
            received_at: Utc::now(),
        }
    }

    /// 消息作者是否为机器人
    fn authored_by_bot(&self) -> bool {
        self.data
            .pointer("/author/bot")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// 丢弃原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 事件未启用
    Disabled,
    /// 机器人消息且未开启存储
    BotMessage,
    /// 斜杠命令交互缺少 `id` 或 `token`，无法回复
    Malformed(String),
}

/// 闸门处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// 丢弃
    Skipped(SkipReason),
    /// 已路由，附带发送出去的信封
    Routed(Envelope),
    /// 放行给下游消费者
    Passed,
}

/// 网关事件闸门
pub struct EventGate {
    config: Arc<ResolvedCallbackConfig>,
    router: Arc<Router>,
}

impl EventGate {
    /// 创建闸门
    pub fn new(config: Arc<ResolvedCallbackConfig>, router: Arc<Router>) -> Self {
        Self { config, router }
    }

    /// 回调配置
    pub fn config(&self) -> &ResolvedCallbackConfig {
        &self.config
    }

    /// 事件是否启用
    pub fn accepts(&self, name: &str) -> bool {
        self.config.is_enabled(&normalize_event_name(name))
    }

    /// 处理一个网关事件
    pub async fn dispatch(&self, event: &GatewayEvent) -> GateOutcome {
        if !self.config.is_enabled(&event.name) {
            trace!(event = %event.name, "事件未启用，丢弃");
            return GateOutcome::Skipped(SkipReason::Disabled);
        }

        if MESSAGE_EVENTS.contains(&event.name.as_str())
            && !self.config.store_bot_messages
            && event.authored_by_bot()
        {
            debug!(event = %event.name, "丢弃机器人消息");
            return GateOutcome::Skipped(SkipReason::BotMessage);
        }

        if event.name == INTERACTION_CREATE {
            let kind = event.data.get("type").and_then(Value::as_u64);
            if kind != Some(INTERACTION_APPLICATION_COMMAND) {
                return GateOutcome::Passed;
            }
            return match Invocation::from_interaction(&event.data) {
                Ok(invocation) => GateOutcome::Routed(self.router.route(&invocation).await),
                Err(e) => match reply_target(&event.data) {
                    Some(invocation) => {
                        warn!(
                            invocation_id = %invocation.id,
                            error = %e,
                            "斜杠命令交互解析失败，返回错误响应"
                        );
                        let error = RouteError::MalformedInvocation(e.to_string());
                        GateOutcome::Routed(self.router.reject(&invocation, error).await)
                    }
                    None => {
                        warn!(error = %e, "斜杠命令交互缺少 id 或 token，无法响应");
                        GateOutcome::Skipped(SkipReason::Malformed(e.to_string()))
                    }
                },
            };
        }

        GateOutcome::Passed
    }
}

/// 解析失败时仍可回复的目标：只要求 `id` 和 `token`
fn reply_target(payload: &Value) -> Option<Invocation> {
    let id = payload.get("id").and_then(Value::as_str)?;
    let token = payload.get("token").and_then(Value::as_str)?;
    let name = payload
        .pointer("/data/name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Some(Invocation::new(id, token, name))
}
