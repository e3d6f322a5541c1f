//! Run a single garbage collection pass
//!
//! Retention is configurable via the system config at
//! `~/.config/snapkeep/config.toml`:
//! ```toml
//! [gc]
//! policy = "Exponential"   # or "LimitBased"
//! max_backups = 7
//! period_secs = 60
//! ```

use crate::system_config;
use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use retention::{GarbageCollector, RetentionPolicy};
use sk_core::SystemClock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

pub async fn run(store_flag: Option<PathBuf>) -> Result<()> {
    let config = system_config::load()?;
    let retention_config = config
        .gc
        .to_retention_config()
        .context("Invalid garbage collection configuration")?;
    let store = util::open_store(store_flag, &config)?;

    // Show retention policy
    println!("Retention policy:");
    match retention_config.policy {
        RetentionPolicy::Exponential => {
            println!("  {} (hour/day/week buckets)", "Exponential".cyan());
        }
        RetentionPolicy::LimitBased { max_backups } => {
            println!(
                "  {} (keep last {} streams)",
                "LimitBased".cyan(),
                max_backups.to_string().cyan()
            );
        }
    }
    println!();

    println!("{}", "Running garbage collection...".bold());

    // One-shot pass: the shutdown channel never fires.
    let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let gc = GarbageCollector::new(store, Arc::new(SystemClock), retention_config, shutdown_rx);
    let stats = gc.collect_once();

    println!();
    if stats.is_empty() {
        println!("{}", "Nothing to delete - store already satisfies the policy".dimmed());
    } else {
        println!("{}", "GC complete".green().bold());
        println!(
            "Full snapshots deleted:  {}",
            stats.fulls_deleted.to_string().yellow()
        );
        println!(
            "Delta snapshots deleted: {}",
            stats.deltas_deleted.to_string().yellow()
        );
        if stats.failures > 0 {
            println!(
                "Failures (retried next pass): {}",
                stats.failures.to_string().red()
            );
        }
    }

    Ok(())
}
