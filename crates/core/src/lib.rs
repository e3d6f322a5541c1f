//! Snapkeep Core - Snapshot primitives for the backup retention system
//!
//! This crate provides the foundational layer:
//! - Snapshot descriptors (full/delta) with total time ordering
//! - The snapshot name codec used by the backup producer
//! - The `SnapshotStore` abstraction and a local filesystem backend
//! - An injectable UTC clock

pub mod clock;
pub mod snapshot;
pub mod store;

// Re-export main types for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use snapshot::{Snapshot, SnapshotKind};
pub use store::{LocalStore, SnapshotStore, StoreError};

/// Common result type used throughout snapkeep-core
pub type Result<T> = anyhow::Result<T>;
