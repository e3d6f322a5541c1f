//! Run the periodic garbage collector until interrupted

use crate::system_config;
use crate::util;
use anyhow::{Context, Result};
use retention::GarbageCollector;
use sk_core::SystemClock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::broadcast;

pub async fn run(store_flag: Option<PathBuf>) -> Result<()> {
    let config = system_config::load()?;
    let retention_config = config
        .gc
        .to_retention_config()
        .context("Invalid garbage collection configuration")?;
    let store = util::open_store(store_flag, &config)?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let gc = GarbageCollector::new(store, Arc::new(SystemClock), retention_config, shutdown_rx);
    let collector = tokio::spawn(gc.run());

    // Translate process signals into the collector's shutdown notification.
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, shutting down");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, shutting down");
        }
    }

    // A pass in progress finishes before the collector observes this.
    let _ = shutdown_tx.send(());
    collector.await?;

    Ok(())
}
