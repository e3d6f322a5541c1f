//! Snapshot descriptors
//!
//! A snapshot is one persisted backup artifact: either a full image of the
//! underlying datastore or a delta applied on top of a preceding full. The
//! backup producer addresses a snapshot as `<snap_dir>/<snap_name>`, and that
//! pair is its identity.

use anyhow::{bail, Context};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Kind of a snapshot: a self-contained full image or an incremental delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SnapshotKind {
    Full,
    Delta,
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotKind::Full => write!(f, "Full"),
            SnapshotKind::Delta => write!(f, "Delta"),
        }
    }
}

impl FromStr for SnapshotKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Full" => Ok(SnapshotKind::Full),
            "Delta" => Ok(SnapshotKind::Delta),
            other => bail!("unknown snapshot kind: {}", other),
        }
    }
}

/// One backup snapshot in the store
///
/// Immutable once created. `start_revision`/`last_revision` are monotonic
/// sequence numbers of the underlying log; `last_revision` breaks ordering
/// ties between snapshots sharing a creation timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub kind: SnapshotKind,
    /// Creation time, UTC, second resolution
    pub created_on: DateTime<Utc>,
    /// Directory component of the store address
    pub snap_dir: String,
    /// Name component of the store address
    pub snap_name: String,
    /// First log revision covered by this snapshot
    pub start_revision: u64,
    /// Last log revision covered by this snapshot
    pub last_revision: u64,
}

impl Snapshot {
    /// Create a full snapshot descriptor with a producer-style name
    pub fn full(
        snap_dir: impl Into<String>,
        start_revision: u64,
        last_revision: u64,
        created_on: DateTime<Utc>,
    ) -> Self {
        Self::new(
            SnapshotKind::Full,
            snap_dir,
            start_revision,
            last_revision,
            created_on,
        )
    }

    /// Create a delta snapshot descriptor with a producer-style name
    pub fn delta(
        snap_dir: impl Into<String>,
        start_revision: u64,
        last_revision: u64,
        created_on: DateTime<Utc>,
    ) -> Self {
        Self::new(
            SnapshotKind::Delta,
            snap_dir,
            start_revision,
            last_revision,
            created_on,
        )
    }

    fn new(
        kind: SnapshotKind,
        snap_dir: impl Into<String>,
        start_revision: u64,
        last_revision: u64,
        created_on: DateTime<Utc>,
    ) -> Self {
        let snap_name = format!(
            "{}-{}-{}-{}",
            kind,
            start_revision,
            last_revision,
            created_on.timestamp()
        );
        Self {
            kind,
            created_on,
            snap_dir: snap_dir.into(),
            snap_name,
            start_revision,
            last_revision,
        }
    }

    /// Parse a snapshot descriptor from its store address
    ///
    /// The producer names snapshot objects
    /// `<Kind>-<start_revision>-<last_revision>-<created_unix>`.
    pub fn parse(snap_dir: &str, snap_name: &str) -> anyhow::Result<Self> {
        let mut parts = snap_name.splitn(4, '-');
        let (kind, start, last, created) = match (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) {
            (Some(k), Some(s), Some(l), Some(c)) => (k, s, l, c),
            _ => bail!("malformed snapshot name: {}", snap_name),
        };

        let kind: SnapshotKind = kind.parse()?;
        let start_revision: u64 = start
            .parse()
            .with_context(|| format!("bad start revision in snapshot name: {}", snap_name))?;
        let last_revision: u64 = last
            .parse()
            .with_context(|| format!("bad last revision in snapshot name: {}", snap_name))?;
        let created_unix: i64 = created
            .parse()
            .with_context(|| format!("bad creation time in snapshot name: {}", snap_name))?;
        let created_on = Utc
            .timestamp_opt(created_unix, 0)
            .single()
            .with_context(|| format!("creation time out of range in snapshot name: {}", snap_name))?;

        Ok(Self {
            kind,
            created_on,
            snap_dir: snap_dir.to_string(),
            snap_name: snap_name.to_string(),
            start_revision,
            last_revision,
        })
    }

    /// Store address of this snapshot, for log messages
    pub fn path(&self) -> String {
        format!("{}/{}", self.snap_dir, self.snap_name)
    }
}

// Snapshots order by creation time with last_revision breaking timestamp
// ties; remaining fields keep the ordering total and consistent with Eq.
impl Ord for Snapshot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.created_on
            .cmp(&other.created_on)
            .then_with(|| self.last_revision.cmp(&other.last_revision))
            .then_with(|| self.start_revision.cmp(&other.start_revision))
            .then_with(|| self.snap_dir.cmp(&other.snap_dir))
            .then_with(|| self.snap_name.cmp(&other.snap_name))
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

impl PartialOrd for Snapshot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
