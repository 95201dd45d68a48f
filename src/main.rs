use anyhow::Context;
use clap::Parser;
use unilookup::app::server;
use unilookup::utils::{logger, validation::Validate};
use unilookup::{AppContext, CliArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = args.resolve().context("failed to load configuration")?;

    // 初始化日誌
    logger::init_logger(config.verbose, config.log_format);

    tracing::info!("Starting unilookup");
    tracing::debug!("Resolved config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let (context, background) =
        AppContext::start(config).context("failed to start application context")?;

    let result = server::serve(context, server::shutdown_signal()).await;
    background.shutdown();

    result.context("HTTP server terminated with an error")
}
