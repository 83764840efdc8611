//! KMHCAL23 Ground Motion Model - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load(None).context("Failed to load configuration")?;
    init_logging(&config.logging).context("Failed to set tracing subscriber")?;

    info!("=== KMHCAL23 Ground Motion Model v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifact: {}", config.model.path);

    run_server(config).await
}
