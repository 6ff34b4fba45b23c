//! 日志初始化
//!
//! 基于 `tracing-subscriber` 安装全局订阅者。`RUST_LOG` 优先于配置中的日志级别。

use tracing_subscriber::EnvFilter;

use crate::config::{LogLevel, LoggingConfig};

/// 将配置中的日志级别转换为过滤指令
pub fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}

/// 初始化日志系统
///
/// 可重复调用；全局订阅者已存在时静默返回 `false`。
pub fn init_logging(config: &LoggingConfig) -> bool {
    if !config.log_to_console {
        return false;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(config.level)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(target: "skeleton", "Logging initialized at {:?}", config.level);
    }
    installed
}
