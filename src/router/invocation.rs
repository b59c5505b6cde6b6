//! 命令调用数据结构
//!
//! 定义平台传入的一次斜杠命令调用（[`Invocation`]）及其原始参数。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::{CoreError, Result};

/// 交互类型：斜杠命令
pub const INTERACTION_APPLICATION_COMMAND: u64 = 2;

/// 参数类型（封闭集合）
///
/// 与平台的数值编码一一对应。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OptionType {
    /// 字符串
    String,
    /// 整数
    Integer,
    /// 布尔值
    Boolean,
    /// 用户引用
    UserRef,
    /// 频道引用
    ChannelRef,
    /// 角色引用
    RoleRef,
    /// 用户或角色引用
    MentionableRef,
    /// 浮点数
    Number,
    /// 附件
    Attachment,
}

impl OptionType {
    /// 平台数值编码
    pub fn wire_code(self) -> u8 {
        match self {
            OptionType::String => 3,
            OptionType::Integer => 4,
            OptionType::Boolean => 5,
            OptionType::UserRef => 6,
            OptionType::ChannelRef => 7,
            OptionType::RoleRef => 8,
            OptionType::MentionableRef => 9,
            OptionType::Number => 10,
            OptionType::Attachment => 11,
        }
    }

    /// 从平台数值编码解析
    pub fn from_wire(code: u8) -> Option<Self> {
        match code {
            3 => Some(OptionType::String),
            4 => Some(OptionType::Integer),
            5 => Some(OptionType::Boolean),
            6 => Some(OptionType::UserRef),
            7 => Some(OptionType::ChannelRef),
            8 => Some(OptionType::RoleRef),
            9 => Some(OptionType::MentionableRef),
            10 => Some(OptionType::Number),
            11 => Some(OptionType::Attachment),
            _ => None,
        }
    }
}

impl TryFrom<u8> for OptionType {
    type Error = String;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        Self::from_wire(code).ok_or_else(|| format!("不支持的参数类型编码: {}", code))
    }
}

impl From<OptionType> for u8 {
    fn from(kind: OptionType) -> Self {
        kind.wire_code()
    }
}

/// 平台传入的原始参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOption {
    /// 参数名
    pub name: String,
    /// 参数类型
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// 参数值
    #[serde(default)]
    pub value: Value,
}

impl RawOption {
    /// 创建原始参数
    pub fn new(name: impl Into<String>, kind: OptionType, value: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
        }
    }

    /// 创建字符串参数
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, OptionType::String, Value::String(value.into()))
    }
}

/// 一次命令调用
///
/// 生命周期为一次路由调用。调用者信息可能位于顶层 `user`，
/// 也可能嵌套在 `member.user` 中（服务器内调用）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invocation {
    /// 交互 ID
    pub id: String,
    /// 交互回复令牌
    pub token: String,
    /// 命令名
    pub command_name: String,
    /// 原始参数
    #[serde(default)]
    pub options: Vec<RawOption>,
    /// 顶层调用者（私信场景）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    /// 成员包装（服务器场景）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Value>,
    /// 服务器 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    /// 频道 ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// 接收时间
    pub received_at: DateTime<Utc>,
}

impl Invocation {
    /// 创建调用
    pub fn new(
        id: impl Into<String>,
        token: impl Into<String>,
        command_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            token: token.into(),
            command_name: command_name.into(),
            options: Vec::new(),
            user: None,
            member: None,
            guild_id: None,
            channel_id: None,
            received_at: Utc::now(),
        }
    }

    /// 设置顶层调用者
    pub fn with_user(mut self, user: Value) -> Self {
        self.user = Some(user);
        self
    }

    /// 设置成员包装
    pub fn with_member(mut self, member: Value) -> Self {
        self.member = Some(member);
        self
    }

    /// 追加参数
    pub fn with_option(mut self, option: RawOption) -> Self {
        self.options.push(option);
        self
    }

    /// 设置服务器
    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    /// 设置频道
    pub fn in_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// 按名称取参数值
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.iter().find(|o| o.name == name).map(|o| &o.value)
    }

    /// 从平台交互 JSON 解码
    ///
    /// 只接受斜杠命令交互（`type == 2`）。子命令与子命令组不在支持范围内。
    pub fn from_interaction(payload: &Value) -> Result<Self> {
        let kind = payload.get("type").and_then(Value::as_u64);
        if kind != Some(INTERACTION_APPLICATION_COMMAND) {
            return Err(CoreError::InvalidInteraction(format!(
                "不是斜杠命令交互: type = {:?}",
                kind
            )));
        }

        let id = required_str(payload, "id")?;
        let token = required_str(payload, "token")?;
        let data = payload
            .get("data")
            .ok_or_else(|| CoreError::InvalidInteraction("缺少 data 字段".to_string()))?;
        let command_name = required_str(data, "name")?;

        let options = match data.get("options") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => serde_json::from_value::<Vec<RawOption>>(raw.clone())
                .map_err(|e| CoreError::InvalidInteraction(format!("参数解析失败: {}", e)))?,
        };

        Ok(Self {
            id,
            token,
            command_name,
            options,
            user: non_null(payload.get("user")),
            member: non_null(payload.get("member")),
            guild_id: payload.get("guild_id").and_then(Value::as_str).map(str::to_string),
            channel_id: payload.get("channel_id").and_then(Value::as_str).map(str::to_string),
            received_at: Utc::now(),
        })
    }
}

fn required_str(value: &Value, key: &str) -> Result<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| CoreError::InvalidInteraction(format!("缺少字符串字段 '{}'", key)))
}

fn non_null(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

/// 调用上下文
///
/// 传给后端操作和响应格式化器，只包含非敏感的定位信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationContext {
    /// 交互 ID
    pub invocation_id: String,
    /// 命令名
    pub command_name: String,
    /// 服务器 ID
    pub guild_id: Option<String>,
    /// 频道 ID
    pub channel_id: Option<String>,
    /// 命令所属领域（命令未找到时为空）
    pub domain: Option<String>,
}

impl InvocationContext {
    /// 从调用构造
    pub fn from_invocation(invocation: &Invocation, domain: Option<&str>) -> Self {
        Self {
            invocation_id: invocation.id.clone(),
            command_name: invocation.command_name.clone(),
            guild_id: invocation.guild_id.clone(),
            channel_id: invocation.channel_id.clone(),
            domain: domain.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_option_type_wire_codes() {
        for code in 3..=11u8 {
            let kind = OptionType::from_wire(code).unwrap();
            assert_eq!(kind.wire_code(), code);
        }
        assert_eq!(OptionType::from_wire(1), None);
        assert_eq!(OptionType::from_wire(12), None);
    }

    #[test]
    fn test_invocation_builder() {
        let invocation = Invocation::new("1", "tok", "echo")
            .with_user(json!({"id": "42"}))
            .with_option(RawOption::string("message", "hi"))
            .in_guild("g1");

        assert_eq!(invocation.option("message"), Some(&json!("hi")));
        assert_eq!(invocation.option("missing"), None);
        assert_eq!(invocation.guild_id.as_deref(), Some("g1"));
    }

    #[test]
    fn test_from_interaction_guild() {
        let payload = json!({
            "id": "1001",
            "token": "abc",
            "type": 2,
            "guild_id": "g1",
            "channel_id": "c1",
            "member": { "user": { "id": "42", "username": "potato" }, "roles": [] },
            "data": {
                "name": "echo",
                "options": [
                    { "name": "message", "type": 3, "value": "hi" },
                    { "name": "times", "type": 4, "value": 2 }
                ]
            }
        });

        let invocation = Invocation::from_interaction(&payload).unwrap();
        assert_eq!(invocation.id, "1001");
        assert_eq!(invocation.command_name, "echo");
        assert_eq!(invocation.options.len(), 2);
        assert_eq!(invocation.options[1].kind, OptionType::Integer);
        assert!(invocation.user.is_none());
        assert_eq!(invocation.member.as_ref().unwrap()["user"]["id"], "42");
        assert_eq!(invocation.channel_id.as_deref(), Some("c1"));
    }

    #[test]
    fn test_from_interaction_without_options() {
        let payload = json!({
            "id": "1", "token": "t", "type": 2,
            "user": { "id": "7" },
            "data": { "name": "ping" }
        });

        let invocation = Invocation::from_interaction(&payload).unwrap();
        assert!(invocation.options.is_empty());
        assert_eq!(invocation.user.as_ref().unwrap()["id"], "7");
    }

    #[test]
    fn test_from_interaction_rejects_components() {
        let payload = json!({ "id": "1", "token": "t", "type": 3, "data": { "custom_id": "x" } });
        assert!(matches!(
            Invocation::from_interaction(&payload),
            Err(CoreError::InvalidInteraction(_))
        ));
    }

    #[test]
    fn test_from_interaction_rejects_subcommands() {
        let payload = json!({
            "id": "1", "token": "t", "type": 2,
            "data": { "name": "admin", "options": [{ "name": "ban", "type": 1, "options": [] }] }
        });
        assert!(Invocation::from_interaction(&payload).is_err());
    }

    #[test]
    fn test_context_from_invocation() {
        let invocation = Invocation::new("1", "t", "echo").in_channel("c9");
        let ctx = InvocationContext::from_invocation(&invocation, Some("chat"));

        assert_eq!(ctx.invocation_id, "1");
        assert_eq!(ctx.channel_id.as_deref(), Some("c9"));
        assert_eq!(ctx.domain.as_deref(), Some("chat"));
    }
}
