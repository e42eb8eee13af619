use anyhow::{Context, Result};
use impulse_test_client::{logger, App, Config};

/// 用法: impulse_test_client [codigo] [--config <archivo.toml>]
#[tokio::main]
async fn main() -> Result<()> {
    let mut codigo = None;
    let mut config_path = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            config_path = Some(args.next().context("--config 需要文件路径")?);
        } else {
            codigo = Some(arg);
        }
    }

    // 加载配置
    let mut config = match config_path {
        Some(path) => Config::from_toml_file(&path).with_context(|| format!("无法读取配置文件 {}", path))?,
        None => Config::from_env(),
    };
    if let Some(codigo) = codigo {
        config.codigo = codigo;
    }

    // 初始化日志
    logger::init_with(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
