//! 回调配置诊断
//!
//! 配置校验不直接失败，而是收集结构化诊断信息；只在启动边界处
//! 转换为 [`ConfigurationError`]。每条诊断都带上出错的值、全部合法取值
//! 和可直接照抄的正确配置示例。

use std::fmt::Write as _;

use thiserror::Error;

/// 诊断码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// 档位名未知
    UnknownProfile,
    /// 回调名未知（既不是事件也不是分类）
    UnknownCallback,
    /// 值类型错误
    InvalidType,
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticCode::UnknownProfile => write!(f, "UNKNOWN_PROFILE"),
            DiagnosticCode::UnknownCallback => write!(f, "UNKNOWN_CALLBACK"),
            DiagnosticCode::InvalidType => write!(f, "INVALID_TYPE"),
        }
    }
}

/// 单条配置诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDiagnostic {
    /// 出错的配置键
    pub key: String,
    /// 诊断码
    pub code: DiagnosticCode,
    /// 错误消息
    pub message: String,
    /// 出错的值
    pub offending: Vec<String>,
    /// 全部合法取值
    pub valid_choices: Vec<String>,
    /// 正确配置示例
    pub examples: Vec<String>,
}

impl ConfigDiagnostic {
    /// 创建新的诊断
    pub fn new(key: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            code,
            message: message.into(),
            offending: Vec::new(),
            valid_choices: Vec::new(),
            examples: Vec::new(),
        }
    }

    /// 设置出错的值
    pub fn with_offending<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.offending = values.into_iter().map(Into::into).collect();
        self
    }

    /// 设置合法取值
    pub fn with_valid_choices<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.valid_choices = values.into_iter().map(Into::into).collect();
        self
    }

    /// 设置配置示例
    pub fn with_examples<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.examples = values.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.key, self.message)?;
        if !self.offending.is_empty() {
            write!(f, "\n  出错的值: {}", self.offending.join(", "))?;
        }
        if !self.valid_choices.is_empty() {
            write!(f, "\n  合法取值: {}", self.valid_choices.join(", "))?;
        }
        for example in &self.examples {
            write!(f, "\n  示例: {}", example)?;
        }
        Ok(())
    }
}

/// 回调配置错误
///
/// 只在启动阶段抛出，表示部署配置有误，应当中止启动。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// 配置校验未通过
    #[error("回调配置无效:\n{}", render_diagnostics(.diagnostics))]
    Invalid {
        /// 全部诊断
        diagnostics: Vec<ConfigDiagnostic>,
    },

    /// 试图禁用核心事件
    #[error(
        "核心回调不可禁用: {}（核心事件: {}）\n  示例: disableCallbacks: [typingStart]",
        .entries.join(", "),
        .core_events.join(", ")
    )]
    CoreCallbackDisableConflict {
        /// `disableCallbacks` 中命中核心事件的条目
        entries: Vec<String>,
        /// 核心事件列表
        core_events: Vec<String>,
    },
}

impl ConfigurationError {
    /// 全部诊断（冲突错误没有诊断列表）
    pub fn diagnostics(&self) -> &[ConfigDiagnostic] {
        match self {
            ConfigurationError::Invalid { diagnostics } => diagnostics,
            ConfigurationError::CoreCallbackDisableConflict { .. } => &[],
        }
    }
}

fn render_diagnostics(diagnostics: &[ConfigDiagnostic]) -> String {
    let mut out = String::new();
    for (i, diagnostic) in diagnostics.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = write!(out, "{}", diagnostic);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display_contains_everything() {
        let diagnostic =
            ConfigDiagnostic::new("profile", DiagnosticCode::UnknownProfile, "未知档位")
            .with_offending(["fast"])
            .with_valid_choices(["minimal", "custom"])
            .with_examples(["profile: minimal"]);

        let text = diagnostic.to_string();
        assert!(text.contains("UNKNOWN_PROFILE"));
        assert!(text.contains("fast"));
        assert!(text.contains("minimal, custom"));
        assert!(text.contains("profile: minimal"));
    }

    #[test]
    fn test_invalid_error_renders_all_diagnostics() {
        let err = ConfigurationError::Invalid {
            diagnostics: vec![
                ConfigDiagnostic::new("profile", DiagnosticCode::UnknownProfile, "a"),
                ConfigDiagnostic::new("enhancedLogging", DiagnosticCode::InvalidType, "b"),
            ],
        };
        let text = err.to_string();
        assert!(text.contains("profile"));
        assert!(text.contains("enhancedLogging"));
        assert_eq!(err.diagnostics().len(), 2);
    }

    #[test]
    fn test_conflict_error_names_entries() {
        let err = ConfigurationError::CoreCallbackDisableConflict {
            entries: vec!["ready".to_string()],
            core_events: vec!["ready".to_string(), "interactionCreate".to_string()],
        };
        assert!(err.to_string().contains("ready"));
        assert!(err.diagnostics().is_empty());
    }
}
