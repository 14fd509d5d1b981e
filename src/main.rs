use anyhow::Result;
use clap::Parser;
use tracing::info;

use roundsmith::telemetry;
use roundsmith::{BaseConfig, RoundSmith};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize telemetry
    telemetry::init();
    info!("Starting roundsmith");

    // Parse configuration from CLI arguments / environment
    let config = BaseConfig::parse();
    info!(
        "Configuration: storage_path={}, token_address={}, break_secs={}, snapshot_source={:?}",
        config.storage_path, config.token_address, config.break_secs, config.snapshot_source
    );

    let app = RoundSmith::initialize(config).await?;

    tokio::select! {
        res = app.run() => res?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown signal received"),
    }

    info!("Roundsmith shutdown complete");
    Ok(())
}
