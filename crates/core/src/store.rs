//! Snapshot store abstraction and the local filesystem backend
//!
//! The store is the durable backing medium for the backup log. The retention
//! engine only ever lists and deletes; snapshot creation belongs to the
//! backup producer and never goes through this interface.

use crate::snapshot::Snapshot;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Failure surfaced by a snapshot store
///
/// The retention engine treats every kind the same way (log and continue);
/// the classification exists for callers that want to count or alert.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("snapshot not found: {0}")]
    NotFound(String),

    #[error("transient store failure at {path}: {source}")]
    Transient {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("permanent store failure at {path}: {source}")]
    Permanent {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(path),
            io::ErrorKind::Interrupted | io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                StoreError::Transient { path, source: err }
            }
            _ => StoreError::Permanent { path, source: err },
        }
    }
}

/// Durable backing store for the backup log
///
/// `list` returns the current snapshot set sorted by creation time (ties by
/// last revision); callers must not assume stability across calls. `delete`
/// removes a single snapshot by identity and may fail if it is absent.
/// Both operations may block on I/O.
pub trait SnapshotStore: Send + Sync {
    fn list(&self) -> Result<Vec<Snapshot>, StoreError>;
    fn delete(&self, snap: &Snapshot) -> Result<(), StoreError>;
}

/// Filesystem-backed snapshot store
///
/// Layout under the root:
/// ```text
/// <root>/
///   <snap_dir>/
///     Full-<start>-<last>-<unix>
///     Delta-<start>-<last>-<unix>
/// ```
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
}

impl SnapshotStore for LocalStore {
    fn list(&self) -> Result<Vec<Snapshot>, StoreError> {
        let mut snaps = Vec::new();

        for dir_entry in fs::read_dir(&self.root).map_err(|e| StoreError::from_io(&self.root, e))? {
            let dir_entry = dir_entry.map_err(|e| StoreError::from_io(&self.root, e))?;
            let dir_path = dir_entry.path();

            if !dir_path.is_dir() {
                continue;
            }
            let snap_dir = dir_entry.file_name().to_string_lossy().to_string();

            for file_entry in
                fs::read_dir(&dir_path).map_err(|e| StoreError::from_io(&dir_path, e))?
            {
                let file_entry = file_entry.map_err(|e| StoreError::from_io(&dir_path, e))?;
                if !file_entry.path().is_file() {
                    continue;
                }

                let snap_name = file_entry.file_name().to_string_lossy().to_string();
                match Snapshot::parse(&snap_dir, &snap_name) {
                    Ok(snap) => snaps.push(snap),
                    Err(e) => {
                        // Foreign files are not snapshots; leave them alone.
                        tracing::warn!("skipping unrecognized file {}/{}: {}", snap_dir, snap_name, e);
                    }
                }
            }
        }

        snaps.sort();
        Ok(snaps)
    }

    fn delete(&self, snap: &Snapshot) -> Result<(), StoreError> {
        let path = self.root.join(&snap.snap_dir).join(&snap.snap_name);
        fs::remove_file(&path).map_err(|e| StoreError::from_io(&path, e))
    }
}
