//! 日志初始化：输出到 stderr，可用 RUST_LOG 覆盖

use tracing_subscriber::EnvFilter;

/// `default_directive` 在未设置 RUST_LOG 时生效，如 `"warn"` 或 `"info"`
pub fn init_logging(default_directive: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    // 重复初始化时忽略
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .try_init();
}
