//! sidequest: desktop overlay daemon gamifying a TAPD workload

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::info;

use sidequest::{runtime, App, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sidequest=info".parse()?),
        )
        .init();

    let args = Args::parse();

    info!("Starting sidequest");
    info!("Data dir: {}", args.data_dir.display());

    let app = Arc::new(App::from_args(&args)?);
    let poll_interval = Duration::from_secs(args.poll_interval_secs);

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    let runtime_handle = tokio::spawn(runtime::run(Arc::clone(&app), poll_interval, shutdown_rx));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(()).await;
    let _ = runtime_handle.await;

    Ok(())
}
