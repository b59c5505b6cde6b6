//! 回调目录
//!
//! 平台网关事件的静态查找表：事件分类（category）与预设档位（profile）。
//! 这里只有常量数据，不持有任何状态。

use std::collections::BTreeSet;

/// 核心事件，任何配置下都必须启用
pub const CORE_EVENTS: &[&str] = &["ready", "interactionCreate", "applicationCommand"];

/// 自定义档位名称
pub const CUSTOM_PROFILE: &str = "custom";

/// 事件分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackCategory {
    /// 分类名称
    pub name: &'static str,
    /// 分类包含的原始事件名
    pub events: &'static [&'static str],
    /// 描述
    pub description: &'static str,
}

/// 预设档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackProfile {
    /// 档位名称
    pub name: &'static str,
    /// 基础回调（事件名或分类名）
    pub base_callbacks: &'static [&'static str],
    /// 默认是否启用增强日志
    pub enhanced_logging: bool,
    /// 是否为性能优化档位
    pub performance_optimized: bool,
    /// 描述
    pub description: &'static str,
}

/// 全部事件分类
pub const CATEGORIES: &[CallbackCategory] = &[
    CallbackCategory {
        name: "coreEvents",
        events: CORE_EVENTS,
        description: "连接就绪与命令交互",
    },
    CallbackCategory {
        name: "messageEvents",
        events: &["messageCreate", "messageUpdate", "messageDelete", "messageDeleteBulk"],
        description: "消息创建、编辑与删除",
    },
    CallbackCategory {
        name: "reactionEvents",
        events: &[
            "messageReactionAdd",
            "messageReactionRemove",
            "messageReactionRemoveAll",
            "messageReactionRemoveEmoji",
        ],
        description: "消息表情回应",
    },
    CallbackCategory {
        name: "guildEvents",
        events: &[
            "guildCreate",
            "guildUpdate",
            "guildDelete",
            "guildAvailable",
            "guildUnavailable",
        ],
        description: "服务器生命周期",
    },
    CallbackCategory {
        name: "memberEvents",
        events: &[
            "guildMemberAdd",
            "guildMemberUpdate",
            "guildMemberRemove",
            "guildMembersChunk",
        ],
        description: "服务器成员变更",
    },
    CallbackCategory {
        name: "roleEvents",
        events: &["guildRoleCreate", "guildRoleUpdate", "guildRoleDelete"],
        description: "角色变更",
    },
    CallbackCategory {
        name: "channelEvents",
        events: &["channelCreate", "channelUpdate", "channelDelete", "channelPinsUpdate"],
        description: "频道变更",
    },
    CallbackCategory {
        name: "threadEvents",
        events: &[
            "threadCreate",
            "threadUpdate",
            "threadDelete",
            "threadListSync",
            "threadMemberUpdate",
            "threadMembersUpdate",
        ],
        description: "子区变更",
    },
    CallbackCategory {
        name: "voiceEvents",
        events: &["voiceStateUpdate", "voiceServerUpdate"],
        description: "语音状态",
    },
    CallbackCategory {
        name: "presenceEvents",
        events: &["presenceUpdate", "typingStart", "userUpdate"],
        description: "在线状态与输入提示",
    },
    CallbackCategory {
        name: "inviteEvents",
        events: &["inviteCreate", "inviteDelete"],
        description: "邀请链接",
    },
    CallbackCategory {
        name: "moderationEvents",
        events: &[
            "guildBanAdd",
            "guildBanRemove",
            "guildAuditLogEntryCreate",
            "autoModerationActionExecution",
        ],
        description: "封禁、审计日志与自动审核",
    },
    CallbackCategory {
        name: "integrationEvents",
        events: &[
            "integrationCreate",
            "integrationUpdate",
            "integrationDelete",
            "webhooksUpdate",
        ],
        description: "集成与 Webhook",
    },
];

/// 全部预设档位（不含 `custom`）
pub const PROFILES: &[CallbackProfile] = &[
    CallbackProfile {
        name: "minimal",
        base_callbacks: &["coreEvents"],
        enhanced_logging: false,
        performance_optimized: true,
        description: "只处理命令交互",
    },
    CallbackProfile {
        name: "production",
        base_callbacks: &[
            "coreEvents",
            "messageEvents",
            "reactionEvents",
            "guildEvents",
            "memberEvents",
            "roleEvents",
            "channelEvents",
            "threadEvents",
            "voiceEvents",
            "presenceEvents",
        ],
        enhanced_logging: false,
        performance_optimized: true,
        description: "常规线上部署",
    },
    CallbackProfile {
        name: "development",
        base_callbacks: &[
            "coreEvents",
            "messageEvents",
            "reactionEvents",
            "guildEvents",
            "memberEvents",
            "roleEvents",
            "channelEvents",
            "threadEvents",
            "voiceEvents",
            "presenceEvents",
            "inviteEvents",
            "moderationEvents",
        ],
        enhanced_logging: true,
        performance_optimized: false,
        description: "本地开发，日志更详细",
    },
    CallbackProfile {
        name: "full",
        base_callbacks: &[
            "coreEvents",
            "messageEvents",
            "reactionEvents",
            "guildEvents",
            "memberEvents",
            "roleEvents",
            "channelEvents",
            "threadEvents",
            "voiceEvents",
            "presenceEvents",
            "inviteEvents",
            "moderationEvents",
            "integrationEvents",
        ],
        enhanced_logging: true,
        performance_optimized: false,
        description: "处理所有已知事件",
    },
];

/// 按名称查找分类
pub fn category(name: &str) -> Option<&'static CallbackCategory> {
    CATEGORIES.iter().find(|c| c.name == name)
}

/// 按名称查找档位
pub fn profile(name: &str) -> Option<&'static CallbackProfile> {
    PROFILES.iter().find(|p| p.name == name)
}

/// 是否为已知的原始事件名
pub fn is_known_event(name: &str) -> bool {
    CATEGORIES.iter().any(|c| c.events.contains(&name))
}

/// 是否为核心事件
pub fn is_core_event(name: &str) -> bool {
    CORE_EVENTS.contains(&name)
}

/// 所有已知原始事件名
pub fn all_events() -> BTreeSet<&'static str> {
    CATEGORIES.iter().flat_map(|c| c.events.iter().copied()).collect()
}

/// 核心事件集合
pub fn core_events() -> BTreeSet<String> {
    CORE_EVENTS.iter().map(|e| e.to_string()).collect()
}

/// 所有档位名（包含 `custom`）
pub fn profile_names() -> Vec<&'static str> {
    PROFILES
        .iter()
        .map(|p| p.name)
        .chain(std::iter::once(CUSTOM_PROFILE))
        .collect()
}

/// 展开分类
///
/// 分类名替换为其包含的事件，其他名称原样保留，结果去重。
pub fn expand_categories<I, S>(entries: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut expanded = BTreeSet::new();
    for entry in entries {
        let entry = entry.as_ref();
        match category(entry) {
            Some(cat) => expanded.extend(cat.events.iter().map(|e| e.to_string())),
            None => {
                expanded.insert(entry.to_string());
            }
        }
    }
    expanded
}

/// 将网关原始事件名（如 `MESSAGE_CREATE`）规范化为目录中的驼峰名
pub fn normalize_event_name(raw: &str) -> String {
    if !raw.contains('_') && raw.chars().next().map_or(false, |c| c.is_lowercase()) {
        return raw.to_string();
    }

    let mut name = String::with_capacity(raw.len());
    for (i, part) in raw.split('_').filter(|p| !p.is_empty()).enumerate() {
        let lower = part.to_lowercase();
        if i == 0 {
            name.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                name.extend(first.to_uppercase());
                name.push_str(chars.as_str());
            }
        }
    }
    name
}
