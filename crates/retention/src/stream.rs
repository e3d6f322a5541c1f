//! Snapshot stream partitioning
//!
//! A snapshot stream is one full snapshot plus the contiguous run of deltas
//! that follow it, up to the next full. The partitioner works on the sorted
//! snapshot list the store returns and yields the list indices where each
//! stream begins.

use sk_core::{Snapshot, SnapshotKind};

/// Indices into `snaps` at which a stream begins
///
/// Index 0 always starts a stream in a non-empty list (the producer
/// guarantees the first snapshot is a full); every later full starts the
/// next one. An empty list has no streams.
pub fn stream_starts(snaps: &[Snapshot]) -> Vec<usize> {
    if snaps.is_empty() {
        return Vec::new();
    }

    let mut starts = vec![0];
    for (index, snap) in snaps.iter().enumerate().skip(1) {
        if snap.kind == SnapshotKind::Full {
            starts.push(index);
        }
    }
    starts
}

/// Slice of the stream starting at `starts[index]`
///
/// The final stream extends to the end of the list.
pub fn stream<'a>(snaps: &'a [Snapshot], starts: &[usize], index: usize) -> &'a [Snapshot] {
    let begin = starts[index];
    let end = starts.get(index + 1).copied().unwrap_or(snaps.len());
    &snaps[begin..end]
}
