//! 回调配置解析
//!
//! 从 [`CallbackConfig`] 计算最终启用的事件集合与运行选项。
//! 纯函数、确定性；调用方应在消费者启动时计算一次并缓存结果，
//! 不要按事件重复计算。
//!
//! 解析顺序：
//!
//! 1. 校验档位、回调名与类型
//! 2. 拒绝禁用核心事件
//! 3. 取档位基础集合（`custom` 只有核心事件）
//! 4. 并入 `enableCallbacks`
//! 5. 减去 `disableCallbacks`
//! 6. 无条件并入核心事件

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use super::catalog::{self, CallbackProfile, CORE_EVENTS, CUSTOM_PROFILE};
use super::config::{keys, CallbackConfig};
use super::diagnostics::{ConfigDiagnostic, ConfigurationError, DiagnosticCode};
use crate::core::config::Environment;

/// 解析后的回调配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCallbackConfig {
    /// 实际生效的档位名
    pub profile: String,
    /// 启用的原始事件
    pub enabled: BTreeSet<String>,
    /// 增强日志
    pub enhanced_logging: bool,
    /// 性能优化
    pub performance_optimized: bool,
    /// 保存机器人消息
    pub store_bot_messages: bool,
    /// 自动创建用户
    pub auto_create_users: bool,
}

impl ResolvedCallbackConfig {
    /// 指定事件是否启用
    pub fn is_enabled(&self, event: &str) -> bool {
        self.enabled.contains(event)
    }
}

/// 校验配置，返回全部诊断（为空表示通过）
pub fn validate(config: &CallbackConfig) -> Vec<ConfigDiagnostic> {
    let mut diagnostics = Vec::new();

    if let Some(ref name) = config.profile {
        if name != CUSTOM_PROFILE && catalog::profile(name).is_none() {
            diagnostics.push(
                ConfigDiagnostic::new(
                    keys::PROFILE,
                    DiagnosticCode::UnknownProfile,
                    format!("未知档位 '{}'", name),
                )
                .with_offending([name.as_str()])
                .with_valid_choices(catalog::profile_names())
                .with_examples([
                    "profile: production",
                    "profile: custom\nenableCallbacks: [messageEvents]",
                ]),
            );
        }
    }

    for (key, entries) in [
        (keys::ENABLE_CALLBACKS, &config.enable_callbacks),
        (keys::DISABLE_CALLBACKS, &config.disable_callbacks),
    ] {
        let unknown: Vec<&str> = entries
            .iter()
            .map(String::as_str)
            .filter(|e| catalog::category(e).is_none() && !catalog::is_known_event(e))
            .collect();

        if !unknown.is_empty() {
            diagnostics.push(
                ConfigDiagnostic::new(
                    key,
                    DiagnosticCode::UnknownCallback,
                    format!("未知的事件或分类: {}", unknown.join(", ")),
                )
                .with_offending(unknown)
                .with_valid_choices(valid_callback_names())
                .with_examples([
                    format!("{}: [messageEvents, guildMemberAdd]", key),
                    format!("{}: [voiceStateUpdate, typingStart]", key),
                ]),
            );
        }
    }

    diagnostics
}

/// 解析配置
///
/// # Errors
///
/// 校验未通过返回 [`ConfigurationError::Invalid`]；
/// 禁用核心事件返回 [`ConfigurationError::CoreCallbackDisableConflict`]。
pub fn resolve(
    config: &CallbackConfig,
    environment: Environment,
) -> Result<ResolvedCallbackConfig, ConfigurationError> {
    let diagnostics = validate(config);
    if !diagnostics.is_empty() {
        return Err(ConfigurationError::Invalid { diagnostics });
    }

    reject_core_disables(&config.disable_callbacks)?;

    let profile_name = config
        .profile
        .clone()
        .unwrap_or_else(|| environment.default_profile().to_string());
    let profile: Option<&CallbackProfile> = catalog::profile(&profile_name);

    let base = match profile {
        Some(p) => catalog::expand_categories(p.base_callbacks.iter()),
        None => catalog::core_events(),
    };

    let mut enabled: BTreeSet<String> = base
        .union(&catalog::expand_categories(&config.enable_callbacks))
        .cloned()
        .collect();

    for event in catalog::expand_categories(&config.disable_callbacks) {
        enabled.remove(&event);
    }

    enabled.extend(catalog::core_events());

    let resolved = ResolvedCallbackConfig {
        enhanced_logging: config
            .enhanced_logging
            .unwrap_or_else(|| profile.map_or(false, |p| p.enhanced_logging)),
        performance_optimized: profile.map_or(false, |p| p.performance_optimized),
        store_bot_messages: config.store_bot_messages.unwrap_or(false),
        auto_create_users: config.auto_create_users.unwrap_or(true),
        profile: profile_name,
        enabled,
    };

    debug!(
        profile = %resolved.profile,
        enabled_count = resolved.enabled.len(),
        enhanced_logging = resolved.enhanced_logging,
        "回调配置解析完成"
    );

    Ok(resolved)
}

/// 禁用项（展开前或展开后）命中核心事件时报错
fn reject_core_disables(disable: &[String]) -> Result<(), ConfigurationError> {
    let offending: Vec<String> = disable
        .iter()
        .filter(|entry| {
            catalog::is_core_event(entry)
                || catalog::expand_categories([entry.as_str()])
                    .iter()
                    .any(|e| catalog::is_core_event(e))
        })
        .cloned()
        .collect();

    if offending.is_empty() {
        Ok(())
    } else {
        Err(ConfigurationError::CoreCallbackDisableConflict {
            entries: offending,
            core_events: CORE_EVENTS.iter().map(|e| e.to_string()).collect(),
        })
    }
}

/// 分类名在前，事件名在后
fn valid_callback_names() -> Vec<String> {
    catalog::CATEGORIES
        .iter()
        .map(|c| c.name.to_string())
        .chain(catalog::all_events().into_iter().map(str::to_string))
        .collect()
}
