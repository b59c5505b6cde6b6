//! 路由器主结构体
//!
//! 整合命令表、身份解析、输入构建、执行、错误翻译与响应格式化，
//! 提供 `route(invocation) -> Envelope`。

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use super::actor::{resolve_actor, Actor, CreationStrategy};
use super::command::{Command, CommandRegistry};
use super::executor::{ActionExecutor, BackendRunner};
use super::input::build_input;
use super::invocation::{Invocation, InvocationContext};
use super::response::{format_outcome, outcome_kind, DefaultFormatter, Envelope, ResponseFormatter};
use super::stats::{RouteStats, RouteStatsSnapshot};
use super::translate::translate;
use crate::callbacks::ResolvedCallbackConfig;
use crate::utils::{Result, RouteError};

/// 响应发送器
///
/// 把信封发回平台。路由器每次调用只发送一次，失败时只记录日志，不重试。
#[async_trait]
pub trait Sender: Send + Sync {
    /// 发送响应
    async fn send(&self, invocation_id: &str, token: &str, envelope: &Envelope) -> Result<()>;
}

/// 命令路由器
///
/// 只持有不可变协作者和原子计数器，可被多个任务并发调用。
pub struct Router {
    registry: Arc<dyn CommandRegistry>,
    executor: ActionExecutor,
    sender: Arc<dyn Sender>,
    creation_strategy: Option<Arc<dyn CreationStrategy>>,
    formatter: Arc<dyn ResponseFormatter>,
    enhanced_logging: bool,
    stats: Arc<RouteStats>,
}

impl Router {
    /// 创建构建器
    pub fn builder(
        registry: Arc<dyn CommandRegistry>,
        backend: Arc<dyn BackendRunner>,
        sender: Arc<dyn Sender>,
    ) -> RouterBuilder {
        RouterBuilder::new(registry, backend, sender)
    }

    /// 路由一次调用
    ///
    /// 无论成功与否，都会且只会发送一个信封，并返回同一个信封。
    #[instrument(
        skip(self, invocation),
        fields(invocation_id = %invocation.id, command = %invocation.command_name)
    )]
    pub async fn route(&self, invocation: &Invocation) -> Envelope {
        let start = Instant::now();

        match self.registry.lookup(&invocation.command_name) {
            Some(command) => self.route_command(invocation, &command).await,
            None => {
                let context = InvocationContext::from_invocation(invocation, None);
                let outcome = Err(RouteError::UnknownCommand(invocation.command_name.clone()));
                self.finish(invocation, None, &context, outcome, start).await
            }
        }
    }

    /// 路由一次已知命令的调用（跳过命令表查找）
    pub async fn route_command(&self, invocation: &Invocation, command: &Command) -> Envelope {
        let start = Instant::now();
        let domain = (!command.domain.is_empty()).then_some(command.domain.as_str());
        let context = InvocationContext::from_invocation(invocation, domain);

        let outcome = self.run(invocation, command, &context).await;
        self.finish(invocation, Some(command), &context, outcome, start).await
    }

    /// 以错误结束一次无法正常路由的调用
    ///
    /// 不查找命令、不调用后端，仍按统一流程格式化、计数并发送一个信封。
    pub async fn reject(&self, invocation: &Invocation, error: RouteError) -> Envelope {
        let start = Instant::now();
        let context = InvocationContext::from_invocation(invocation, None);
        self.finish(invocation, None, &context, Err(error), start).await
    }

    async fn run(
        &self,
        invocation: &Invocation,
        command: &Command,
        context: &InvocationContext,
    ) -> std::result::Result<Value, RouteError> {
        let actor = resolve_actor(invocation, self.creation_strategy.as_deref()).await?;
        let input = build_input(&command.operation, command.kind, &invocation.options);

        self.log_dispatch(command, &actor, input.keys().map(String::as_str).collect());

        let execution = self.executor.execute(command, input, &actor, context).await?;
        Ok(execution.value)
    }

    fn log_dispatch(&self, command: &Command, actor: &Actor, inputs: Vec<&str>) {
        if self.enhanced_logging {
            info!(
                operation = %command.operation,
                kind = %command.kind,
                actor = actor.kind_str(),
                inputs = ?inputs,
                "分发命令"
            );
        } else {
            debug!(operation = %command.operation, kind = %command.kind, "分发命令");
        }
    }

    async fn finish(
        &self,
        invocation: &Invocation,
        command: Option<&Command>,
        context: &InvocationContext,
        outcome: std::result::Result<Value, RouteError>,
        start: Instant,
    ) -> Envelope {
        if let Err(err) = &outcome {
            let translated = translate(err);
            warn!(
                kind = %translated.kind,
                code = err.error_code(),
                detail = %translated.developer_message,
                "命令执行失败"
            );
        }

        let formatter: &dyn ResponseFormatter = command
            .and_then(|c| c.response_formatter.as_deref())
            .unwrap_or(self.formatter.as_ref());
        let envelope = format_outcome(formatter, &outcome, context);

        let latency_us = start.elapsed().as_micros() as u64;
        self.stats.record(outcome_kind(&outcome), latency_us);

        if let Err(e) = self.sender.send(&invocation.id, &invocation.token, &envelope).await {
            self.stats.record_send_failure();
            error!(error = %e, "响应发送失败");
        }

        debug!(latency_us, ephemeral = envelope.is_ephemeral(), "路由完成");
        envelope
    }

    /// 获取统计快照
    pub fn stats(&self) -> RouteStatsSnapshot {
        self.stats.snapshot()
    }

    /// 重置统计
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// 命令表
    pub fn registry(&self) -> &Arc<dyn CommandRegistry> {
        &self.registry
    }

    /// 是否配置了用户创建策略
    pub fn creates_users(&self) -> bool {
        self.creation_strategy.is_some()
    }
}

/// 路由器构建器
pub struct RouterBuilder {
    registry: Arc<dyn CommandRegistry>,
    backend: Arc<dyn BackendRunner>,
    sender: Arc<dyn Sender>,
    creation_strategy: Option<Arc<dyn CreationStrategy>>,
    formatter: Option<Arc<dyn ResponseFormatter>>,
    enhanced_logging: bool,
    auto_create_users: bool,
}

impl RouterBuilder {
    /// 创建构建器
    pub fn new(
        registry: Arc<dyn CommandRegistry>,
        backend: Arc<dyn BackendRunner>,
        sender: Arc<dyn Sender>,
    ) -> Self {
        Self {
            registry,
            backend,
            sender,
            creation_strategy: None,
            formatter: None,
            enhanced_logging: false,
            auto_create_users: true,
        }
    }

    /// 设置用户创建策略
    pub fn creation_strategy(mut self, strategy: Arc<dyn CreationStrategy>) -> Self {
        self.creation_strategy = Some(strategy);
        self
    }

    /// 设置默认响应格式化器
    pub fn formatter(mut self, formatter: Arc<dyn ResponseFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// 应用回调配置中的选项
    ///
    /// `auto_create_users == false` 时不使用创建策略。
    pub fn callback_options(mut self, resolved: &ResolvedCallbackConfig) -> Self {
        self.enhanced_logging = resolved.enhanced_logging;
        self.auto_create_users = resolved.auto_create_users;
        self
    }

    /// 构建路由器
    pub fn build(self) -> Router {
        let creation_strategy = if self.auto_create_users {
            self.creation_strategy
        } else {
            if self.creation_strategy.is_some() {
                info!("自动创建用户已关闭，忽略创建策略");
            }
            None
        };

        Router {
            registry: self.registry,
            executor: ActionExecutor::new(self.backend),
            sender: self.sender,
            creation_strategy,
            formatter: self.formatter.unwrap_or_else(|| Arc::new(DefaultFormatter)),
            enhanced_logging: self.enhanced_logging,
            stats: Arc::new(RouteStats::new()),
        }
    }
}
