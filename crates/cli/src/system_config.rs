//! System-wide configuration for Snapkeep
//!
//! System config is stored at `~/.config/snapkeep/config.toml` (Linux/macOS)
//! or `%APPDATA%\snapkeep\config.toml` (Windows).
//!
//! Example configuration:
//! ```toml
//! [store]
//! dir = "/var/backups/kv-snapshots"
//!
//! [gc]
//! policy = "Exponential"   # or "LimitBased"
//! max_backups = 7          # streams kept under LimitBased
//! period_secs = 60         # sleep between collection passes
//! ```

use anyhow::{bail, Context, Result};
use retention::{RetentionConfig, RetentionPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// System-wide Snapkeep configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Snapshot store configuration
    pub store: StoreConfig,

    /// Garbage collection configuration
    pub gc: GcConfig,
}

/// Snapshot store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory of the snapshot store
    pub dir: Option<PathBuf>,
}

/// Garbage collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GcConfig {
    /// Retention policy: "Exponential" or "LimitBased" (case-sensitive)
    pub policy: String,

    /// Snapshot streams to retain under LimitBased (default: 7)
    pub max_backups: u32,

    /// Seconds between collection passes (default: 60)
    pub period_secs: u64,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            policy: "Exponential".to_string(),
            max_backups: 7,
            period_secs: 60,
        }
    }
}

impl GcConfig {
    /// Convert to retention::RetentionConfig
    ///
    /// Rejects unknown policy identifiers before the collector starts; the
    /// match is case-sensitive on purpose.
    pub fn to_retention_config(&self) -> Result<RetentionConfig> {
        let policy = match self.policy.as_str() {
            "Exponential" => RetentionPolicy::Exponential,
            "LimitBased" => RetentionPolicy::LimitBased {
                max_backups: self.max_backups,
            },
            other => bail!(
                "unknown garbage collection policy '{}' (expected \"Exponential\" or \"LimitBased\")",
                other
            ),
        };

        let config = RetentionConfig {
            policy,
            period: Duration::from_secs(self.period_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Get the system config directory path
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir().map(|h| h.join(".config/snapkeep"))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::config_dir().map(|c| c.join("snapkeep"))
    }
}

/// Get the system config file path
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load system configuration
///
/// Returns default config if the file doesn't exist.
pub fn load() -> Result<SystemConfig> {
    let config_path = match config_file_path() {
        Some(p) => p,
        None => {
            tracing::debug!("Could not determine config directory, using defaults");
            return Ok(SystemConfig::default());
        }
    };

    if !config_path.exists() {
        tracing::debug!(
            "System config not found at {}, using defaults",
            config_path.display()
        );
        return Ok(SystemConfig::default());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read system config at {}", config_path.display()))?;

    let config: SystemConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse system config at {}", config_path.display()))?;

    tracing::debug!("Loaded system config from {}", config_path.display());
    Ok(config)
}

/// Generate example config content for display
pub fn example_config() -> String {
    let config = SystemConfig::default();
    let mut content = String::from("# Snapkeep System Configuration\n");
    content.push_str("# Location: ~/.config/snapkeep/config.toml\n\n");
    content.push_str(&toml::to_string_pretty(&config).unwrap_or_default());
    content
}
