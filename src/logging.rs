//! 日志初始化
//!
//! 基于 tracing-subscriber，日志写到 stderr，不干扰 CLI 的标准输出。

use crate::error::{Error, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 覆盖日志过滤规则的环境变量
pub const LOG_ENV: &str = "GRAPHLAB_LOG";

/// 默认过滤规则
pub const DEFAULT_FILTER: &str = "graphlab=info";

/// 由命令行参数推导过滤规则
///
/// `level` 可以是单独的级别（如 `debug`），也可以是完整的过滤表达式。
pub fn filter_directive(verbose: bool, level: Option<&str>) -> String {
    match (verbose, level) {
        (_, Some(level)) if level.contains('=') => level.to_string(),
        (_, Some(level)) => format!("graphlab={}", level),
        (true, None) => "graphlab=debug".to_string(),
        (false, None) => DEFAULT_FILTER.to_string(),
    }
}

/// 初始化全局 tracing 订阅者
///
/// 优先使用 `RUST_LOG`，其次 `GRAPHLAB_LOG`，最后使用参数推导出的规则。
pub fn init_tracing(verbose: bool, level: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV))
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(verbose, level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| Error::Config(format!("日志初始化失败: {}", e)))
}
