//! 响应信封与格式化
//!
//! [`Envelope`] 是发送给平台的交互响应。格式化器把执行结果转换为信封，
//! 命令可以声明自己的格式化器覆盖默认实现。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::executor::{BackendError, FieldError};
use super::invocation::InvocationContext;
use super::translate::{translate, validation_message, TranslatedError};
use crate::utils::{ErrorKind, RouteError};

/// 仅调用者可见标志位
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

/// 平台消息内容长度上限（字符）
pub const MAX_CONTENT_LENGTH: usize = 2000;

const TRUNCATION_MARKER: &str = "...";

/// 响应类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ResponseType {
    /// 心跳应答
    Pong,
    /// 立即回复消息
    ChannelMessageWithSource,
    /// 延迟回复
    DeferredChannelMessageWithSource,
    /// 延迟更新组件消息
    DeferredUpdateMessage,
    /// 更新组件消息
    UpdateMessage,
}

impl ResponseType {
    /// 平台数值编码
    pub fn wire_code(self) -> u8 {
        match self {
            ResponseType::Pong => 1,
            ResponseType::ChannelMessageWithSource => 4,
            ResponseType::DeferredChannelMessageWithSource => 5,
            ResponseType::DeferredUpdateMessage => 6,
            ResponseType::UpdateMessage => 7,
        }
    }
}

impl TryFrom<u8> for ResponseType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ResponseType::Pong),
            4 => Ok(ResponseType::ChannelMessageWithSource),
            5 => Ok(ResponseType::DeferredChannelMessageWithSource),
            6 => Ok(ResponseType::DeferredUpdateMessage),
            7 => Ok(ResponseType::UpdateMessage),
            other => Err(format!("不支持的响应类型编码: {}", other)),
        }
    }
}

impl From<ResponseType> for u8 {
    fn from(kind: ResponseType) -> Self {
        kind.wire_code()
    }
}

/// 响应消息数据
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MessageData {
    /// 文本内容
    pub content: String,
    /// 标志位
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    /// 嵌入内容
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Value>>,
    /// 交互组件
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Value>>,
}

/// 响应信封
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// 响应类型
    #[serde(rename = "type")]
    pub kind: ResponseType,
    /// 消息数据
    pub data: MessageData,
}

impl Envelope {
    /// 公开消息
    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: ResponseType::ChannelMessageWithSource,
            data: MessageData {
                content: content.into(),
                ..Default::default()
            },
        }
    }

    /// 仅调用者可见的消息
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self::message(content).with_flags(EPHEMERAL_FLAG)
    }

    /// 追加标志位
    pub fn with_flags(mut self, flags: u64) -> Self {
        self.data.flags = Some(self.data.flags.unwrap_or(0) | flags);
        self
    }

    /// 设置嵌入内容
    pub fn with_embeds(mut self, embeds: Vec<Value>) -> Self {
        self.data.embeds = Some(embeds);
        self
    }

    /// 设置交互组件
    pub fn with_components(mut self, components: Vec<Value>) -> Self {
        self.data.components = Some(components);
        self
    }

    /// 是否仅调用者可见
    pub fn is_ephemeral(&self) -> bool {
        self.data.flags.is_some_and(|f| f & EPHEMERAL_FLAG != 0)
    }

    /// 文本内容
    pub fn content(&self) -> &str {
        &self.data.content
    }
}

/// 响应格式化器
///
/// 三个方法都必须返回信封，格式化本身不会失败。
pub trait ResponseFormatter: Send + Sync {
    /// 成功结果
    fn format_success(&self, value: &Value, context: &InvocationContext) -> Envelope;

    /// 一般错误
    fn format_error(&self, error: &TranslatedError, context: &InvocationContext) -> Envelope;

    /// 输入校验错误
    fn format_validation_errors(
        &self,
        errors: &[FieldError],
        context: &InvocationContext,
    ) -> Envelope;
}

/// 默认格式化器：纯文本，错误仅调用者可见
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatter;

impl DefaultFormatter {
    /// 把结果渲染为文本：字符串原样输出，其余输出紧凑 JSON
    pub fn render(value: &Value) -> String {
        match value {
            Value::Null => "Done".to_string(),
            Value::String(s) if s.is_empty() => "Done".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl ResponseFormatter for DefaultFormatter {
    fn format_success(&self, value: &Value, _context: &InvocationContext) -> Envelope {
        Envelope::message(truncate(&Self::render(value)))
    }

    fn format_error(&self, error: &TranslatedError, _context: &InvocationContext) -> Envelope {
        Envelope::ephemeral(truncate(&error.user_message))
    }

    fn format_validation_errors(
        &self,
        errors: &[FieldError],
        _context: &InvocationContext,
    ) -> Envelope {
        Envelope::ephemeral(truncate(&validation_message(errors)))
    }
}

/// 截断到平台内容长度上限（按字符计）
pub fn truncate(content: &str) -> String {
    if content.chars().count() <= MAX_CONTENT_LENGTH {
        return content.to_string();
    }
    let keep = MAX_CONTENT_LENGTH - TRUNCATION_MARKER.len();
    let mut out: String = content.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// 按执行结果分派到格式化器
///
/// 成功 → `format_success`；输入校验错误 → `format_validation_errors`；
/// 其余错误先翻译再交给 `format_error`。
pub fn format_outcome(
    formatter: &dyn ResponseFormatter,
    outcome: &Result<Value, RouteError>,
    context: &InvocationContext,
) -> Envelope {
    match outcome {
        Ok(value) => formatter.format_success(value, context),
        Err(RouteError::Backend(BackendError::Invalid { errors })) => {
            formatter.format_validation_errors(errors, context)
        }
        Err(err) => formatter.format_error(&translate(err), context),
    }
}

/// 结果对应的错误分类（成功为 `None`）
pub fn outcome_kind(outcome: &Result<Value, RouteError>) -> Option<ErrorKind> {
    outcome.as_ref().err().map(RouteError::kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::invocation::Invocation;
    use serde_json::json;

    fn context() -> InvocationContext {
        InvocationContext::from_invocation(&Invocation::new("1", "t", "echo"), Some("chat"))
    }

    #[test]
    fn test_envelope_wire_shape() {
        let envelope = Envelope::ephemeral("nope");
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(wire, json!({"type": 4, "data": {"content": "nope", "flags": 64}}));

        let public = serde_json::to_value(Envelope::message("hi")).unwrap();
        assert!(public["data"].get("flags").is_none());
    }

    #[test]
    fn test_envelope_deserialize() {
        let raw = json!({"type": 7, "data": {"content": "x", "flags": 68}});
        let envelope: Envelope = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.kind, ResponseType::UpdateMessage);
        assert!(envelope.is_ephemeral());

        let unknown_type = json!({"type": 2, "data": {"content": ""}});
        assert!(serde_json::from_value::<Envelope>(unknown_type).is_err());
    }

    #[test]
    fn test_flags_are_merged() {
        let envelope = Envelope::message("x").with_flags(4).with_flags(EPHEMERAL_FLAG);
        assert_eq!(envelope.data.flags, Some(68));
    }

    #[test]
    fn test_default_render() {
        assert_eq!(DefaultFormatter::render(&json!("hi")), "hi");
        assert_eq!(DefaultFormatter::render(&json!({"id": 1})), r#"{"id":1}"#);
        assert_eq!(DefaultFormatter::render(&Value::Null), "Done");
    }

    #[test]
    fn test_truncate_to_limit() {
        let long = "字".repeat(MAX_CONTENT_LENGTH + 10);
        let out = truncate(&long);
        assert_eq!(out.chars().count(), MAX_CONTENT_LENGTH);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(truncate("short"), "short");
    }

    #[test]
    fn test_dispatch() {
        let formatter = DefaultFormatter;
        let ctx = context();

        let ok = format_outcome(&formatter, &Ok(json!("hi")), &ctx);
        assert_eq!(ok.content(), "hi");
        assert!(!ok.is_ephemeral());

        let invalid = Err(RouteError::Backend(BackendError::invalid(vec![
            FieldError::required("message"),
        ])));
        let envelope = format_outcome(&formatter, &invalid, &ctx);
        assert_eq!(envelope.content(), "message is required");
        assert!(envelope.is_ephemeral());
        assert_eq!(outcome_kind(&invalid), Some(ErrorKind::Validation));

        let auth = format_outcome(&formatter, &Err(RouteError::AuthenticationRequired), &ctx);
        assert_eq!(auth.content(), "You must be signed in to use this command");
        assert!(auth.is_ephemeral());
    }
}
