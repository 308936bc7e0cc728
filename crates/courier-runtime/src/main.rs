//! # Courier
//!
//! Entry point: one process hosting the HTTP gateway, the auth and profile
//! services, and the in-process broker between them.

use anyhow::{Context, Result};
use courier_runtime::{CourierRuntime, RuntimeConfig};
use courier_telemetry::init_telemetry;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Failed to load configuration")?;
    let _telemetry = init_telemetry(&config.telemetry).context("Failed to initialize telemetry")?;

    config
        .validate_for_production()
        .context("Refusing to start with insecure configuration")?;

    info!("===========================================");
    info!("  Courier v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");

    let runtime = CourierRuntime::start(config).await.context("Failed to start services")?;
    info!(addr = %runtime.local_addr(), "Courier ready");

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl-C")?;
    info!("Shutdown signal received");

    runtime.shutdown().await;
    Ok(())
}
