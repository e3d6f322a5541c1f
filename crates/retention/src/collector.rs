//! Periodic snapshot garbage collector
//!
//! One collection pass: list the store, partition into streams, sweep the
//! deltas of every non-latest stream, then decide each head full under the
//! configured policy. Every pass is best-effort and self-contained; nothing
//! is carried between passes and the next pass implicitly retries whatever
//! failed.

use crate::policy::{RetentionConfig, RetentionPolicy, RetentionWalk, Verdict};
use crate::stream::{stream, stream_starts};
use sk_core::{Clock, Snapshot, SnapshotStore, StoreError};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Outcome of one collection pass, for operator display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub fulls_deleted: usize,
    pub deltas_deleted: usize,
    pub failures: usize,
}

impl CollectionStats {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The retention engine plus its scheduler loop
pub struct GarbageCollector {
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    config: RetentionConfig,
    shutdown: broadcast::Receiver<()>,
}

impl GarbageCollector {
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
        config: RetentionConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            shutdown,
        }
    }

    /// Run collection passes every `period` until the shutdown signal
    ///
    /// A pass in progress is never interrupted; shutdown is observed at the
    /// boundary between passes.
    pub async fn run(mut self) {
        tracing::info!(
            "GC: garbage collector started, collecting every {:?}",
            self.config.period
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("GC: Stop signal received. Closing garbage collector.");
                    return;
                }
                _ = tokio::time::sleep(self.config.period) => {
                    self.collect_once();
                }
            }
        }
    }

    /// One collection pass over the store
    pub fn collect_once(&self) -> CollectionStats {
        let mut stats = CollectionStats::default();
        tracing::info!("GC: Executing garbage collection...");

        let snap_list = match self.store.list() {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!("GC: Failed to list snapshots: {}", e);
                stats.failures += 1;
                return stats;
            }
        };

        let starts = stream_starts(&snap_list);
        if starts.is_empty() {
            return stats;
        }

        let now = self.clock.now_utc();
        match self.config.policy {
            RetentionPolicy::Exponential => {
                self.collect_exponential(&snap_list, &starts, now, &mut stats)
            }
            RetentionPolicy::LimitBased { max_backups } => {
                self.collect_limit_based(&snap_list, &starts, max_backups, &mut stats)
            }
        }

        if stats.is_empty() {
            tracing::debug!("GC: pass complete, nothing to delete");
        } else {
            tracing::info!(
                "GC: pass complete: {} full and {} delta snapshots deleted, {} failures",
                stats.fulls_deleted,
                stats.deltas_deleted,
                stats.failures
            );
        }
        stats
    }

    /// Exponential policy: walk heads newest to oldest through the bucket
    /// state machine, keeping the newest head per bucket
    fn collect_exponential(
        &self,
        snaps: &[Snapshot],
        starts: &[usize],
        now: chrono::DateTime<chrono::Utc>,
        stats: &mut CollectionStats,
    ) {
        let mut walk = RetentionWalk::new(now);

        // The newest stream is skipped entirely: its head and deltas encode
        // the tip of the log and stay available for point-in-time restore.
        for index in (0..starts.len().saturating_sub(1)).rev() {
            let snap_stream = stream(snaps, starts, index);
            if self.sweep_deltas(snap_stream, stats).is_err() {
                // The head decision is gated on a clean delta sweep; bucket
                // state is left untouched for the next pass.
                continue;
            }

            let head = &snap_stream[0];
            if let Verdict::Delete = walk.step(head.created_on) {
                self.delete_full(head, stats);
            }
        }
    }

    /// Limit-based policy: keep the most recent `max_backups` streams,
    /// deleting older heads oldest-first
    fn collect_limit_based(
        &self,
        snaps: &[Snapshot],
        starts: &[usize],
        max_backups: u32,
        stats: &mut CollectionStats,
    ) {
        let total = starts.len() as i64;

        for index in 0..starts.len().saturating_sub(1) {
            let snap_stream = stream(snaps, starts, index);
            if self.sweep_deltas(snap_stream, stats).is_err() {
                continue;
            }

            if (index as i64) < total - i64::from(max_backups) {
                self.delete_full(&snap_stream[0], stats);
            }
        }
    }

    /// Delete the deltas of one stream, newest first, leaving the head full
    ///
    /// Newest-first ordering means every delta still present applies cleanly
    /// on top of the head. The first failure aborts the sweep; deltas already
    /// deleted stay deleted.
    fn sweep_deltas(
        &self,
        snap_stream: &[Snapshot],
        stats: &mut CollectionStats,
    ) -> Result<(), StoreError> {
        for snap in snap_stream.iter().skip(1).rev() {
            tracing::info!("GC: Deleting old delta snapshot: {}", snap.path());
            if let Err(e) = self.store.delete(snap) {
                tracing::warn!("GC: Failed to delete snapshot {}: {}", snap.path(), e);
                stats.failures += 1;
                return Err(e);
            }
            stats.deltas_deleted += 1;
        }
        Ok(())
    }

    fn delete_full(&self, snap: &Snapshot, stats: &mut CollectionStats) {
        tracing::info!("GC: Deleting old full snapshot: {}", snap.path());
        match self.store.delete(snap) {
            Ok(()) => stats.fulls_deleted += 1,
            Err(e) => {
                tracing::warn!("GC: Failed to delete snapshot {}: {}", snap.path(), e);
                stats.failures += 1;
            }
        }
    }
}
