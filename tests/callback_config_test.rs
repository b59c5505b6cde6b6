//! 回调配置集成测试
//!
//! 覆盖档位解析场景，以及对全部分类和事件组合成立的性质。

use std::collections::BTreeSet;

use chips_interaction::callbacks::catalog::{self, CATEGORIES, CORE_EVENTS, PROFILES};
use chips_interaction::callbacks::{
    expand_categories, resolve, CallbackConfig, ConfigurationError, DiagnosticCode,
};
use chips_interaction::Environment;
use serde_json::json;

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// 所有可出现在 enable/disable 中的合法名称
fn all_names() -> Vec<String> {
    CATEGORIES
        .iter()
        .map(|c| c.name.to_string())
        .chain(catalog::all_events().into_iter().map(str::to_string))
        .collect()
}

fn non_core_names() -> Vec<String> {
    all_names()
        .into_iter()
        .filter(|n| n != "coreEvents" && !catalog::is_core_event(n))
        .collect()
}

// ============================================================================
// 场景
// ============================================================================

#[test]
fn test_minimal_profile_is_exactly_core() {
    let resolved =
        resolve(&CallbackConfig::new().profile("minimal"), Environment::Development).unwrap();
    assert_eq!(resolved.enabled, set(&["ready", "interactionCreate", "applicationCommand"]));
}

#[test]
fn test_production_with_disables() {
    let config = CallbackConfig::new()
        .profile("production")
        .disable(["voiceStateUpdate", "typingStart"]);
    let resolved = resolve(&config, Environment::Production).unwrap();

    assert!(resolved.is_enabled("messageCreate"));
    assert!(resolved.is_enabled("guildCreate"));
    assert!(!resolved.is_enabled("voiceStateUpdate"));
    assert!(!resolved.is_enabled("typingStart"));
    assert!(resolved.is_enabled("voiceServerUpdate"));
}

#[test]
fn test_custom_with_category_and_disable() {
    let config = CallbackConfig::new()
        .profile("custom")
        .enable(["messageEvents"])
        .disable(["messageDelete"]);
    let resolved = resolve(&config, Environment::Production).unwrap();

    for event in ["messageCreate", "messageUpdate", "messageDeleteBulk"] {
        assert!(resolved.is_enabled(event), "{} should be enabled", event);
    }
    for event in CORE_EVENTS {
        assert!(resolved.is_enabled(event));
    }
    assert!(!resolved.is_enabled("messageDelete"));
    assert!(!resolved.is_enabled("guildCreate"));
}

#[test]
fn test_full_profile_enables_every_event() {
    let resolved = resolve(&CallbackConfig::new().profile("full"), Environment::Test).unwrap();
    let all: BTreeSet<String> = catalog::all_events().into_iter().map(str::to_string).collect();
    assert_eq!(resolved.enabled, all);
}

#[test]
fn test_development_excludes_integration_events() {
    let resolved =
        resolve(&CallbackConfig::new().profile("development"), Environment::Test).unwrap();
    assert!(!resolved.is_enabled("webhooksUpdate"));
    assert!(resolved.is_enabled("inviteCreate"));
}

#[test]
fn test_unknown_names_fail_validation() {
    let config = CallbackConfig::new().profile("production").enable(["messageCreated"]);
    let err = resolve(&config, Environment::Production).unwrap_err();

    let diagnostics = err.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::UnknownCallback);
    assert!(err.to_string().contains("messageCreated"));
}

#[test]
fn test_loose_map_with_snake_case_keys() {
    let value = json!({
        "profile": "custom",
        "enable_callbacks": ["reactionEvents"],
        "storeBotMessages": true,
        "someOtherKey": 42
    });

    let config = CallbackConfig::from_value(&value).unwrap();
    let resolved = resolve(&config, Environment::Production).unwrap();

    assert!(resolved.is_enabled("messageReactionAdd"));
    assert!(resolved.store_bot_messages);
}

#[test]
fn test_loose_map_type_errors_collected() {
    let value = json!({
        "profile": 3,
        "enableCallbacks": "messageEvents",
        "autoCreateUsers": "yes"
    });

    let err = CallbackConfig::from_value(&value).unwrap_err();
    assert_eq!(err.diagnostics().len(), 3);
    assert!(err
        .diagnostics()
        .iter()
        .all(|d| d.code == DiagnosticCode::InvalidType));
}

// ============================================================================
// 性质
// ============================================================================

#[test]
fn test_disabling_any_core_event_is_rejected() {
    for profile in PROFILES.iter().map(|p| p.name).chain(["custom"]) {
        for core in CORE_EVENTS.iter().copied().chain(["coreEvents"]) {
            let config = CallbackConfig::new().profile(profile).disable([core]);
            let err = resolve(&config, Environment::Production).unwrap_err();
            assert!(
                matches!(err, ConfigurationError::CoreCallbackDisableConflict { .. }),
                "profile={} disable={}",
                profile,
                core
            );
        }
    }
}

#[test]
fn test_core_events_always_enabled() {
    let names = non_core_names();
    for profile in PROFILES.iter().map(|p| p.name).chain(["custom"]) {
        for name in &names {
            let config = CallbackConfig::new().profile(profile).disable([name.as_str()]);
            let resolved = resolve(&config, Environment::Production).unwrap();
            assert!(resolved.enabled.is_superset(&catalog::core_events()));
        }
    }
}

#[test]
fn test_expand_categories_is_idempotent() {
    let names = all_names();

    let whole = expand_categories(&names);
    assert_eq!(expand_categories(&whole), whole);

    for (i, a) in names.iter().enumerate() {
        let single = expand_categories([a]);
        assert_eq!(expand_categories(&single), single);

        let b = &names[(i * 7 + 3) % names.len()];
        let pair = expand_categories([a, b]);
        assert_eq!(expand_categories(&pair), pair);
    }
}

#[test]
fn test_disable_beats_enable_after_expansion() {
    for name in non_core_names() {
        let config = CallbackConfig::new()
            .profile("custom")
            .enable(all_names().into_iter().filter(|n| n != "coreEvents"))
            .disable([name.as_str()]);
        let resolved = resolve(&config, Environment::Production).unwrap();

        for event in expand_categories([&name]) {
            assert!(!resolved.is_enabled(&event), "{} should be disabled via {}", event, name);
        }
    }
}
