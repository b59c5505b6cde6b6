//! 后端输入构建
//!
//! 把平台原始参数转换为后端输入映射。这是一道安全边界：
//! 后端永远不会收到它没有声明过的键。

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::command::{OperationKind, OperationRef};
use super::invocation::RawOption;

/// 后端输入映射
pub type InputMap = BTreeMap<String, Value>;

/// 输入白名单：声明的参数名，创建/更新时再加上接受的属性名
pub fn allow_list(operation: &OperationRef, kind: OperationKind) -> BTreeSet<&str> {
    let mut allowed: BTreeSet<&str> = operation.arguments.iter().map(String::as_str).collect();
    if kind.accepts_attributes() {
        allowed.extend(operation.accepts.iter().map(String::as_str));
    }
    allowed
}

/// 构建后端输入
///
/// 只拷贝白名单内且实际出现的参数，不补默认值；必填校验交给后端操作。
/// 同名参数以最后一次出现为准。
pub fn build_input(
    operation: &OperationRef,
    kind: OperationKind,
    options: &[RawOption],
) -> InputMap {
    let raw: HashMap<&str, &Value> = options.iter().map(|o| (o.name.as_str(), &o.value)).collect();

    allow_list(operation, kind)
        .into_iter()
        .filter_map(|name| raw.get(name).map(|value| (name.to_string(), (*value).clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::invocation::OptionType;
    use serde_json::json;

    fn operation() -> OperationRef {
        OperationRef::new("note", "create")
            .with_arguments(["channel"])
            .with_accepts(["title", "body"])
    }

    #[test]
    fn test_create_accepts_attributes_and_arguments() {
        let options = vec![
            RawOption::string("title", "hello"),
            RawOption::new("channel", OptionType::ChannelRef, json!("c1")),
            RawOption::string("extra", "dropped"),
        ];

        let input = build_input(&operation(), OperationKind::Create, &options);
        assert_eq!(input.len(), 2);
        assert_eq!(input["title"], "hello");
        assert_eq!(input["channel"], "c1");
        assert!(!input.contains_key("extra"));
    }

    #[test]
    fn test_read_ignores_accepted_attributes() {
        let options = vec![
            RawOption::string("title", "hello"),
            RawOption::new("channel", OptionType::ChannelRef, json!("c1")),
        ];

        let input = build_input(&operation(), OperationKind::Read, &options);
        assert_eq!(input.keys().collect::<Vec<_>>(), vec!["channel"]);
    }

    #[test]
    fn test_absent_values_are_not_synthesized() {
        let input = build_input(&operation(), OperationKind::Create, &[]);
        assert!(input.is_empty());
    }

    #[test]
    fn test_allow_list_by_kind() {
        let op = operation();
        assert_eq!(allow_list(&op, OperationKind::GenericAction).len(), 1);
        assert_eq!(allow_list(&op, OperationKind::Update).len(), 3);
    }

    #[test]
    fn test_never_emits_keys_outside_allow_list() {
        let op = operation();
        let names = ["title", "body", "channel", "id", "owner", "admin", "__proto__", ""];
        for kind in [
            OperationKind::Create,
            OperationKind::Read,
            OperationKind::GenericAction,
            OperationKind::Update,
            OperationKind::Destroy,
        ] {
            let options: Vec<RawOption> =
                names.iter().map(|n| RawOption::string(*n, "v")).collect();
            let input = build_input(&op, kind, &options);
            let allowed = allow_list(&op, kind);
            assert!(input.keys().all(|k| allowed.contains(k.as_str())));
        }
    }

    #[test]
    fn test_last_duplicate_wins() {
        let options = vec![
            RawOption::string("title", "first"),
            RawOption::string("title", "second"),
        ];
        let input = build_input(&operation(), OperationKind::Create, &options);
        assert_eq!(input["title"], "second");
    }
}
