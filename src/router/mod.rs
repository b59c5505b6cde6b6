//! 路由模块
//!
//! 包含斜杠命令路由的核心组件：
//! - 命令调用数据结构
//! - 命令定义与命令表
//! - 调用者身份解析
//! - 后端输入构建与操作执行
//! - 错误翻译与响应格式化
//! - 路由器主结构体与统计
//! - 网关事件闸门

pub mod actor;
pub mod command;
pub mod executor;
pub mod gate;
pub mod input;
pub mod invocation;
pub mod response;
pub mod router;
pub mod stats;
pub mod translate;

// 重导出常用类型
pub use actor::{extract_caller, resolve_actor, Actor, CreationStrategy};
pub use command::{
    Command, CommandOption, CommandRegistry, InMemoryRegistry, OperationKind, OperationRef,
    OptionChoice, Scope,
};
pub use executor::{
    ActionExecutor, BackendError, BackendRunner, Execution, ExecutionError, FieldError,
    FieldErrorKind,
};
pub use gate::{EventGate, GateOutcome, GatewayEvent, SkipReason};
pub use input::{allow_list, build_input, InputMap};
pub use invocation::{Invocation, InvocationContext, OptionType, RawOption};
pub use response::{
    format_outcome, DefaultFormatter, Envelope, MessageData, ResponseFormatter, ResponseType,
    EPHEMERAL_FLAG, MAX_CONTENT_LENGTH,
};
pub use router::{Router, RouterBuilder, Sender};
pub use stats::{RouteStats, RouteStatsSnapshot};
pub use translate::{translate, validation_message, TranslatedError};
