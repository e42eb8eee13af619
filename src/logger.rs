use tracing_subscriber::EnvFilter;

/// 初始化 tracing 输出，`RUST_LOG` 优先；`verbose` 为真时默认级别为 debug
pub fn init_with(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("impulse_test_client={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
