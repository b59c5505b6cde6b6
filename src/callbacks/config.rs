//! 回调配置记录
//!
//! 显式的配置结构体，所有字段都是可选的。既可以用构建器直接构造，
//! 也可以从配置文件里的松散映射（JSON/YAML）解析。

use serde_json::Value;

use super::catalog;
use super::diagnostics::{ConfigDiagnostic, ConfigurationError, DiagnosticCode};

/// 配置键（驼峰写法为准，同时接受下划线写法）
pub mod keys {
    /// 档位
    pub const PROFILE: &str = "profile";
    /// 启用列表
    pub const ENABLE_CALLBACKS: &str = "enableCallbacks";
    /// 禁用列表
    pub const DISABLE_CALLBACKS: &str = "disableCallbacks";
    /// 增强日志
    pub const ENHANCED_LOGGING: &str = "enhancedLogging";
    /// 自动创建用户
    pub const AUTO_CREATE_USERS: &str = "autoCreateUsers";
    /// 保存机器人消息
    pub const STORE_BOT_MESSAGES: &str = "storeBotMessages";
}

/// 回调配置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackConfig {
    /// 档位名（缺省时由部署环境决定）
    pub profile: Option<String>,
    /// 额外启用的事件或分类
    pub enable_callbacks: Vec<String>,
    /// 禁用的事件或分类
    pub disable_callbacks: Vec<String>,
    /// 增强日志
    pub enhanced_logging: Option<bool>,
    /// 自动创建用户
    pub auto_create_users: Option<bool>,
    /// 保存机器人消息
    pub store_bot_messages: Option<bool>,
}

impl CallbackConfig {
    /// 创建空配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置档位
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// 追加启用项
    pub fn enable<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enable_callbacks.extend(entries.into_iter().map(Into::into));
        self
    }

    /// 追加禁用项
    pub fn disable<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disable_callbacks.extend(entries.into_iter().map(Into::into));
        self
    }

    /// 设置增强日志
    pub fn enhanced_logging(mut self, enable: bool) -> Self {
        self.enhanced_logging = Some(enable);
        self
    }

    /// 设置自动创建用户
    pub fn auto_create_users(mut self, enable: bool) -> Self {
        self.auto_create_users = Some(enable);
        self
    }

    /// 设置保存机器人消息
    pub fn store_bot_messages(mut self, enable: bool) -> Self {
        self.store_bot_messages = Some(enable);
        self
    }

    /// 从松散映射解析
    ///
    /// `null` 视为空配置；未知键被忽略；类型错误收集为诊断后一并返回。
    pub fn from_value(value: &Value) -> Result<Self, ConfigurationError> {
        let map = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(ConfigurationError::Invalid {
                    diagnostics: vec![ConfigDiagnostic::new(
                        "callbacks",
                        DiagnosticCode::InvalidType,
                        format!("回调配置必须是映射，实际为 {}", type_name(other)),
                    )
                    .with_offending([other.to_string()])
                    .with_examples(["callbacks: { profile: production }"])],
                });
            }
        };

        let lookup = |key: &str| map.get(key).or_else(|| map.get(&snake_case(key)));
        let mut diagnostics = Vec::new();
        let mut config = Self::default();

        match lookup(keys::PROFILE) {
            None | Some(Value::Null) => {}
            Some(Value::String(s)) => config.profile = Some(s.clone()),
            Some(other) => diagnostics.push(
                ConfigDiagnostic::new(
                    keys::PROFILE,
                    DiagnosticCode::InvalidType,
                    format!("档位必须是字符串，实际为 {}", type_name(other)),
                )
                .with_offending([other.to_string()])
                .with_valid_choices(catalog::profile_names())
                .with_examples(["profile: production"]),
            ),
        }

        let list = |key: &str, diagnostics: &mut Vec<ConfigDiagnostic>| {
            parse_list(lookup(key), key, diagnostics)
        };
        config.enable_callbacks = list(keys::ENABLE_CALLBACKS, &mut diagnostics);
        config.disable_callbacks = list(keys::DISABLE_CALLBACKS, &mut diagnostics);

        let flag = |key: &str, diagnostics: &mut Vec<ConfigDiagnostic>| {
            parse_bool(lookup(key), key, diagnostics)
        };
        config.enhanced_logging = flag(keys::ENHANCED_LOGGING, &mut diagnostics);
        config.auto_create_users = flag(keys::AUTO_CREATE_USERS, &mut diagnostics);
        config.store_bot_messages = flag(keys::STORE_BOT_MESSAGES, &mut diagnostics);

        if diagnostics.is_empty() {
            Ok(config)
        } else {
            Err(ConfigurationError::Invalid { diagnostics })
        }
    }
}

fn parse_list(
    value: Option<&Value>,
    key: &str,
    diagnostics: &mut Vec<ConfigDiagnostic>,
) -> Vec<String> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            diagnostics.push(
                ConfigDiagnostic::new(
                    key,
                    DiagnosticCode::InvalidType,
                    format!("必须是事件名或分类名的列表，实际为 {}", type_name(other)),
                )
                .with_offending([other.to_string()])
                .with_examples([format!("{}: [messageEvents, guildMemberAdd]", key)]),
            );
            return Vec::new();
        }
    };

    let mut names = Vec::with_capacity(items.len());
    let mut bad = Vec::new();
    for item in items {
        match item {
            Value::String(s) => names.push(s.clone()),
            other => bad.push(other.to_string()),
        }
    }
    if !bad.is_empty() {
        diagnostics.push(
            ConfigDiagnostic::new(key, DiagnosticCode::InvalidType, "列表元素必须是字符串")
                .with_offending(bad)
                .with_examples([format!("{}: [messageEvents, guildMemberAdd]", key)]),
        );
    }
    names
}

fn parse_bool(
    value: Option<&Value>,
    key: &str,
    diagnostics: &mut Vec<ConfigDiagnostic>,
) -> Option<bool> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(other) => {
            diagnostics.push(
                ConfigDiagnostic::new(
                    key,
                    DiagnosticCode::InvalidType,
                    format!("必须是布尔值，实际为 {}", type_name(other)),
                )
                .with_offending([other.to_string()])
                .with_valid_choices(["true", "false"])
                .with_examples([format!("{}: true", key)]),
            );
            None
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "布尔值",
        Value::Number(_) => "数字",
        Value::String(_) => "字符串",
        Value::Array(_) => "列表",
        Value::Object(_) => "映射",
    }
}

/// `enableCallbacks` -> `enable_callbacks`
fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let config = CallbackConfig::new()
            .profile("production")
            .disable(["typingStart"])
            .enhanced_logging(true);

        assert_eq!(config.profile.as_deref(), Some("production"));
        assert_eq!(config.disable_callbacks, vec!["typingStart".to_string()]);
        assert_eq!(config.enhanced_logging, Some(true));
        assert_eq!(config.store_bot_messages, None);
    }

    #[test]
    fn test_from_value_null_is_empty() {
        assert_eq!(CallbackConfig::from_value(&Value::Null).unwrap(), CallbackConfig::default());
    }

    #[test]
    fn test_from_value_camel_and_snake_keys() {
        let config = CallbackConfig::from_value(&json!({
            "profile": "custom",
            "enableCallbacks": ["messageEvents"],
            "disable_callbacks": ["messageDelete"],
            "store_bot_messages": true,
            "somethingUnknown": 42
        }))
        .unwrap();

        assert_eq!(config.profile.as_deref(), Some("custom"));
        assert_eq!(config.enable_callbacks, vec!["messageEvents".to_string()]);
        assert_eq!(config.disable_callbacks, vec!["messageDelete".to_string()]);
        assert_eq!(config.store_bot_messages, Some(true));
    }

    #[test]
    fn test_from_value_rejects_non_boolean() {
        let err = CallbackConfig::from_value(&json!({ "enhancedLogging": "yes" })).unwrap_err();
        let diagnostics = err.diagnostics();

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].key, keys::ENHANCED_LOGGING);
        assert_eq!(diagnostics[0].code, DiagnosticCode::InvalidType);
        assert_eq!(diagnostics[0].offending, vec!["\"yes\"".to_string()]);
        assert!(!diagnostics[0].valid_choices.is_empty());
        assert!(!diagnostics[0].examples.is_empty());
    }

    #[test]
    fn test_from_value_collects_all_type_errors() {
        let err = CallbackConfig::from_value(&json!({
            "profile": 3,
            "enableCallbacks": "messageEvents",
            "disableCallbacks": ["typingStart", 7],
            "autoCreateUsers": 1
        }))
        .unwrap_err();

        assert_eq!(err.diagnostics().len(), 4);
    }

    #[test]
    fn test_from_value_rejects_non_map() {
        let err = CallbackConfig::from_value(&json!(["production"])).unwrap_err();
        assert_eq!(err.diagnostics()[0].code, DiagnosticCode::InvalidType);
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("enableCallbacks"), "enable_callbacks");
        assert_eq!(snake_case("profile"), "profile");
    }
}
