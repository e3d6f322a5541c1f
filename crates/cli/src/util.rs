//! Shared utilities for CLI commands

use crate::system_config::SystemConfig;
use anyhow::{Context, Result};
use sk_core::LocalStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Resolve the snapshot store directory: CLI flag first, then system config
pub fn resolve_store_dir(flag: Option<PathBuf>, config: &SystemConfig) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    config.store.dir.clone().context(
        "No snapshot store configured. Pass --store <DIR> or set [store] dir in the config.",
    )
}

/// Open the local snapshot store at the resolved directory
pub fn open_store(flag: Option<PathBuf>, config: &SystemConfig) -> Result<Arc<LocalStore>> {
    let dir = resolve_store_dir(flag, config)?;
    let store = LocalStore::open(&dir)
        .with_context(|| format!("Failed to open snapshot store at {}", dir.display()))?;
    Ok(Arc::new(store))
}
