//! 命令定义与命令表
//!
//! 管理命令名到后端操作的映射关系。命令表在构建时一次性填充，
//! 之后只读，可在多个路由调用之间安全共享。

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use super::invocation::OptionType;
use super::response::ResponseFormatter;
use crate::utils::{CoreError, Result};

/// 命令名与参数名格式
///
/// 平台要求：1-32 个字符，小写字母、数字、连字符或下划线。
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-_\p{Ll}\p{N}]{1,32}$").expect("Invalid command name regex"));

/// 后端操作类型（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// 创建
    Create,
    /// 读取/查询
    Read,
    /// 通用动作
    GenericAction,
    /// 更新（尚未支持）
    Update,
    /// 删除（尚未支持）
    Destroy,
}

impl OperationKind {
    /// 路由器是否能执行该类型
    pub fn is_supported(self) -> bool {
        matches!(
            self,
            OperationKind::Create | OperationKind::Read | OperationKind::GenericAction
        )
    }

    /// 是否接受属性写入（属性名进入输入白名单）
    pub fn accepts_attributes(self) -> bool {
        matches!(self, OperationKind::Create | OperationKind::Update)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Create => write!(f, "create"),
            OperationKind::Read => write!(f, "read"),
            OperationKind::GenericAction => write!(f, "action"),
            OperationKind::Update => write!(f, "update"),
            OperationKind::Destroy => write!(f, "destroy"),
        }
    }
}

/// 后端操作引用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRef {
    /// 后端资源
    pub resource: String,
    /// 操作名
    pub action: String,
    /// 操作声明的参数名
    #[serde(default)]
    pub arguments: Vec<String>,
    /// 操作接受的属性名（仅对创建/更新生效）
    #[serde(default)]
    pub accepts: Vec<String>,
}

impl OperationRef {
    /// 创建操作引用
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
            arguments: Vec::new(),
            accepts: Vec::new(),
        }
    }

    /// 设置参数名
    pub fn with_arguments<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = names.into_iter().map(Into::into).collect();
        self
    }

    /// 设置接受的属性名
    pub fn with_accepts<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepts = names.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Display for OperationRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource, self.action)
    }
}

/// 命令作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// 仅在服务器内注册
    #[default]
    Guild,
    /// 全局注册
    Global,
}

/// 参数可选值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChoice {
    /// 显示名
    pub name: String,
    /// 取值
    pub value: Value,
}

/// 命令参数声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    /// 参数名
    pub name: String,
    /// 参数类型
    #[serde(rename = "type")]
    pub kind: OptionType,
    /// 描述
    pub description: String,
    /// 是否必填
    #[serde(default)]
    pub required: bool,
    /// 可选值
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<OptionChoice>>,
}

impl CommandOption {
    /// 创建参数声明
    pub fn new(name: impl Into<String>, kind: OptionType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
            choices: None,
        }
    }

    /// 设为必填
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// 设置可选值
    pub fn with_choices(mut self, choices: Vec<OptionChoice>) -> Self {
        self.choices = Some(choices);
        self
    }
}

/// 命令定义
///
/// 由命令表持有，构建后不再修改。
#[derive(Clone)]
pub struct Command {
    /// 命令名（唯一）
    pub name: String,
    /// 描述
    pub description: String,
    /// 后端操作
    pub operation: OperationRef,
    /// 操作类型
    pub kind: OperationKind,
    /// 参数声明
    pub options: Vec<CommandOption>,
    /// 作用域
    pub scope: Scope,
    /// 自定义响应格式化器
    pub response_formatter: Option<Arc<dyn ResponseFormatter>>,
    /// 所属领域
    pub domain: String,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("operation", &self.operation)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("scope", &self.scope)
            .field("custom_formatter", &self.response_formatter.is_some())
            .field("domain", &self.domain)
            .finish()
    }
}

impl Command {
    /// 创建命令
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        operation: OperationRef,
        kind: OperationKind,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            operation,
            kind,
            options: Vec::new(),
            scope: Scope::Guild,
            response_formatter: None,
            domain: String::new(),
        }
    }

    /// 追加参数声明
    pub fn with_option(mut self, option: CommandOption) -> Self {
        self.options.push(option);
        self
    }

    /// 设置作用域
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// 设置所属领域
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// 设置自定义响应格式化器
    pub fn with_formatter(mut self, formatter: Arc<dyn ResponseFormatter>) -> Self {
        self.response_formatter = Some(formatter);
        self
    }

    /// 按平台要求排序的参数：必填在前，其余保持声明顺序
    pub fn wire_options(&self) -> Vec<&CommandOption> {
        let mut options: Vec<&CommandOption> = self.options.iter().collect();
        options.sort_by_key(|o| !o.required);
        options
    }

    /// 平台注册载荷
    pub fn registration_payload(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "type": 1,
            "options": self.wire_options(),
        })
    }

    /// 检查命令名和参数名
    fn validate(&self) -> Result<()> {
        if !NAME_REGEX.is_match(&self.name) {
            return Err(CoreError::InvalidCommand(format!(
                "命令名格式无效: '{}'",
                self.name
            )));
        }
        if self.description.is_empty() || self.description.chars().count() > 100 {
            return Err(CoreError::InvalidCommand(format!(
                "命令 '{}' 的描述长度必须在 1-100 个字符之间",
                self.name
            )));
        }
        for option in &self.options {
            if !NAME_REGEX.is_match(&option.name) {
                return Err(CoreError::InvalidCommand(format!(
                    "命令 '{}' 的参数名格式无效: '{}'",
                    self.name, option.name
                )));
            }
        }
        Ok(())
    }
}

/// 命令表
///
/// 按名称查找命令定义。
pub trait CommandRegistry: Send + Sync {
    /// 查找命令
    fn lookup(&self, name: &str) -> Option<Arc<Command>>;

    /// 全部命令
    fn commands(&self) -> Vec<Arc<Command>>;
}

/// 内存命令表
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    commands: HashMap<String, Arc<Command>>,
}

impl InMemoryRegistry {
    /// 从命令列表构建
    ///
    /// # Errors
    ///
    /// 命令名或参数名格式无效返回 [`CoreError::InvalidCommand`]，
    /// 命令名重复返回 [`CoreError::DuplicateCommand`]。
    pub fn from_commands(commands: Vec<Command>) -> Result<Self> {
        let mut map = HashMap::with_capacity(commands.len());
        for command in commands {
            command.validate()?;
            if map.contains_key(&command.name) {
                return Err(CoreError::DuplicateCommand(command.name));
            }
            map.insert(command.name.clone(), Arc::new(command));
        }
        Ok(Self { commands: map })
    }

    /// 指定作用域的命令，按名称排序
    pub fn by_scope(&self, scope: Scope) -> Vec<Arc<Command>> {
        let mut commands: Vec<Arc<Command>> = self
            .commands
            .values()
            .filter(|c| c.scope == scope)
            .cloned()
            .collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }

    /// 命令数量
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl CommandRegistry for InMemoryRegistry {
    fn lookup(&self, name: &str) -> Option<Arc<Command>> {
        self.commands.get(name).cloned()
    }

    fn commands(&self) -> Vec<Arc<Command>> {
        let mut commands: Vec<Arc<Command>> = self.commands.values().cloned().collect();
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        commands
    }
}
