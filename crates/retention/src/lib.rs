//! Retention policies and garbage collection for the backup snapshot log
//!
//! This crate provides:
//! - Retention policy configuration (limit-based and exponential)
//! - The time-bucket state machine behind the exponential policy
//! - Snapshot stream partitioning (one full plus its deltas)
//! - The periodic garbage collector with cooperative shutdown

pub mod collector;
pub mod policy;
pub mod stream;

// Re-exports
pub use collector::{CollectionStats, GarbageCollector};
pub use policy::{RetentionConfig, RetentionPolicy, RetentionWalk, Verdict};
pub use stream::{stream, stream_starts};

/// Result type for retention operations
pub type Result<T> = anyhow::Result<T>;
