//! Chips Interaction 命令行入口
//!
//! 离线检查回调配置与事件目录。
//!
//! # 命令概览
//!
//! - `version` - 显示版本信息
//! - `check-config` - 验证配置文件
//! - `profiles` - 列出档位与事件分类
//! - `resolve` - 计算启用的事件集合
//!
//! # 使用示例
//!
//! ```bash
//! # 检查配置文件
//! chips-interaction check-config -c config.yaml
//!
//! # 以生产环境解析回调配置
//! chips-interaction -c config.yaml resolve --env prod
//! ```

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use chips_interaction::callbacks::{catalog, validate, CallbackConfig};
use chips_interaction::{AppConfig, Environment, Logger, LoggerConfig};

/// Chips Interaction - 薯片交互核心
#[derive(Parser)]
#[command(name = "chips-interaction")]
#[command(version, about = "聊天机器人斜杠命令路由与事件回调配置", long_about = None)]
#[command(author = "Chips Team")]
#[command(propagate_version = true)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    /// 子命令
    #[command(subcommand)]
    command: Option<Commands>,
}

/// 可用的子命令
#[derive(Subcommand)]
enum Commands {
    /// 查看版本信息
    Version,

    /// 验证配置文件
    ///
    /// 解析配置文件并校验回调配置，列出全部诊断。
    CheckConfig {
        /// 配置文件路径（不指定则使用全局 -c 选项）
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// 列出档位与事件分类
    Profiles,

    /// 解析回调配置
    ///
    /// 输出最终启用的事件集合与运行选项（JSON）。
    Resolve {
        /// 覆盖部署环境 (dev, test, prod)
        #[arg(short, long)]
        env: Option<String>,
    },
}

/// 打印版本信息
fn print_version() {
    println!();
    println!("Chips Interaction - 薯片交互核心");
    println!("═══════════════════════════════════════");
    println!("  版本:     {}", chips_interaction::VERSION);
    println!("  目标平台: {}", std::env::consts::ARCH);
    println!("  操作系统: {}", std::env::consts::OS);
    println!("═══════════════════════════════════════");
    println!();
}

/// 检查配置文件
async fn check_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("检查配置文件: {}", path.display());
    println!();

    let config = match AppConfig::from_file(path).await {
        Ok(config) => config,
        Err(e) => {
            println!("❌ 配置文件无效: {}", e);
            return Err(Box::new(e));
        }
    };

    let callbacks = match CallbackConfig::from_value(&config.callbacks) {
        Ok(callbacks) => callbacks,
        Err(e) => {
            println!("❌ 回调配置无效:\n{}", e);
            return Err(Box::new(e));
        }
    };

    let diagnostics = validate(&callbacks);
    if !diagnostics.is_empty() {
        println!("❌ 回调配置有 {} 处问题:", diagnostics.len());
        for diagnostic in &diagnostics {
            println!("{}", diagnostic);
        }
        return Err(format!("{} 处配置问题", diagnostics.len()).into());
    }

    let resolved = config.resolve_callbacks()?;
    println!("✅ 配置文件有效！");
    println!();
    println!("────────────────────────────────────────");
    println!("  部署环境:     {}", config.environment());
    println!("  生效档位:     {}", resolved.profile);
    println!("  启用事件数:   {}", resolved.enabled.len());
    println!("  增强日志:     {}", if resolved.enhanced_logging { "是" } else { "否" });
    println!("  自动创建用户: {}", if resolved.auto_create_users { "是" } else { "否" });
    println!("  日志级别:     {}", config.logging.level);
    println!("────────────────────────────────────────");
    Ok(())
}

/// 列出档位与事件分类
fn print_profiles() {
    println!();
    println!("档位");
    println!("═══════════════════════════════════════");
    for profile in catalog::PROFILES {
        println!(
            "  {:<12} 增强日志={:<5} 性能优化={:<5} {}",
            profile.name,
            profile.enhanced_logging,
            profile.performance_optimized,
            profile.description
        );
        println!("               {}", profile.base_callbacks.join(", "));
    }
    println!("  {:<12} 只包含核心事件，其余由 enableCallbacks 指定", catalog::CUSTOM_PROFILE);
    println!();
    println!("事件分类");
    println!("═══════════════════════════════════════");
    for category in catalog::CATEGORIES {
        println!("  {:<18} {}", category.name, category.description);
        println!("                     {}", category.events.join(", "));
    }
    println!();
}

/// 解析回调配置并输出 JSON
async fn resolve(path: &Path, env: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = if path.exists() {
        AppConfig::from_file(path).await?
    } else {
        AppConfig::default()
    };

    if let Some(env) = env {
        let parsed = Environment::parse(&env)
            .ok_or_else(|| format!("无法识别的部署环境: {}", env))?;
        config.environment = Some(parsed.to_string());
    }

    let resolved = config.resolve_callbacks()?;
    let _guard = Logger::try_init(
        LoggerConfig::from_log_config(&config.logging).with_callback_options(&resolved),
    );
    info!(profile = %resolved.profile, events = resolved.enabled.len(), "回调配置已解析");

    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) | None => print_version(),
        Some(Commands::CheckConfig { config }) => {
            let config_path = config.unwrap_or(cli.config);
            check_config(&config_path).await?;
        }
        Some(Commands::Profiles) => print_profiles(),
        Some(Commands::Resolve { env }) => resolve(&cli.config, env).await?,
    }

    Ok(())
}
