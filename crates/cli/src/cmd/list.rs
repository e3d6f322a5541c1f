//! List the snapshots currently in the store

use crate::system_config;
use crate::util;
use anyhow::Result;
use owo_colors::OwoColorize;
use sk_core::{SnapshotKind, SnapshotStore};
use std::path::PathBuf;

pub async fn run(store_flag: Option<PathBuf>) -> Result<()> {
    let config = system_config::load()?;
    let store = util::open_store(store_flag, &config)?;

    let snaps = store.list()?;
    if snaps.is_empty() {
        println!("{}", "No snapshots in store".dimmed());
        return Ok(());
    }

    println!("{}", "Snapshots".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    let mut fulls = 0usize;
    for snap in &snaps {
        let kind = match snap.kind {
            SnapshotKind::Full => {
                fulls += 1;
                "Full ".green().to_string()
            }
            SnapshotKind::Delta => "Delta".cyan().to_string(),
        };
        println!(
            "{}  {}  rev {}..{}  {}",
            kind,
            snap.created_on.format("%Y-%m-%d %H:%M:%S UTC"),
            snap.start_revision,
            snap.last_revision,
            snap.path().dimmed()
        );
    }

    println!();
    println!(
        "{} snapshots ({} full, {} delta)",
        snaps.len(),
        fulls,
        snaps.len() - fulls
    );

    Ok(())
}
