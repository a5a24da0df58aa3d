use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;

use tracing::info;

use relay::{AppConfig, ApplicationServer, Logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let config = Arc::new(AppConfig::parse());

    // init logger and sentry, guards are kept alive to flush logs and maintain sentry connection
    let _guards = Logger::init(
        config.cargo_env,
        config.log_level.as_deref(),
        config.sentry_dsn.clone(),
    );

    info!(
        "logger and env prepped, relaying {} (prefix '{}')...",
        config.source_root(),
        config.normalized_prefix()
    );

    ApplicationServer::serve(config)
        .await
        .context("relay server failed to start")?;

    Ok(())
}
