//! Integration tests for the retention crate against the local store

use chrono::{DateTime, Duration, TimeZone, Utc};
use retention::{GarbageCollector, RetentionConfig, RetentionPolicy};
use sk_core::{FixedClock, LocalStore, Snapshot, SnapshotStore};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tempfile::TempDir;
use tokio::sync::broadcast;

fn write_snap(root: &Path, snap: &Snapshot) {
    let dir = root.join(&snap.snap_dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(&snap.snap_name), b"snapshot-bytes").unwrap();
}

fn collector(store: Arc<LocalStore>, now: DateTime<Utc>, policy: RetentionPolicy) -> GarbageCollector {
    let (_tx, rx) = broadcast::channel(1);
    GarbageCollector::new(
        store,
        Arc::new(FixedClock(now)),
        RetentionConfig {
            policy,
            period: StdDuration::from_secs(60),
        },
        rx,
    )
}

#[test]
fn limit_based_prunes_old_streams_on_disk() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(LocalStore::open(tmp.path()).unwrap());
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

    let fulls: Vec<Snapshot> = (1..=5)
        .rev()
        .map(|h| Snapshot::full("backup-001", 0, 100 * (6 - h) as u64, now - Duration::hours(h)))
        .collect();
    for snap in &fulls {
        write_snap(tmp.path(), snap);
    }

    let stats = collector(
        Arc::clone(&store),
        now,
        RetentionPolicy::LimitBased { max_backups: 3 },
    )
    .collect_once();

    assert_eq!(stats.fulls_deleted, 2);
    assert_eq!(store.list().unwrap(), fulls[2..].to_vec());
}

#[test]
fn limit_based_sweeps_deltas_but_keeps_retained_heads() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(LocalStore::open(tmp.path()).unwrap());
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

    let old_full = Snapshot::full("backup-001", 0, 100, now - Duration::hours(2));
    let old_delta_a = Snapshot::delta("backup-001", 100, 110, now - Duration::minutes(110));
    let old_delta_b = Snapshot::delta("backup-001", 110, 120, now - Duration::minutes(100));
    let new_full = Snapshot::full("backup-001", 120, 200, now - Duration::hours(1));
    let new_delta = Snapshot::delta("backup-001", 200, 210, now - Duration::minutes(50));

    for snap in [&old_full, &old_delta_a, &old_delta_b, &new_full, &new_delta] {
        write_snap(tmp.path(), snap);
    }

    let stats = collector(
        Arc::clone(&store),
        now,
        RetentionPolicy::LimitBased { max_backups: 2 },
    )
    .collect_once();

    assert_eq!(stats.deltas_deleted, 2);
    assert_eq!(stats.fulls_deleted, 0);
    assert_eq!(
        store.list().unwrap(),
        vec![old_full, new_full, new_delta]
    );
}

#[test]
fn latest_stream_survives_any_policy() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(LocalStore::open(tmp.path()).unwrap());
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

    let old_full = Snapshot::full("backup-001", 0, 100, now - Duration::hours(5));
    let old_delta = Snapshot::delta("backup-001", 100, 110, now - Duration::hours(4));
    let tip_full = Snapshot::full("backup-001", 110, 200, now - Duration::hours(1));
    let tip_delta_a = Snapshot::delta("backup-001", 200, 210, now - Duration::minutes(40));
    let tip_delta_b = Snapshot::delta("backup-001", 210, 220, now - Duration::minutes(20));

    for snap in [&old_full, &old_delta, &tip_full, &tip_delta_a, &tip_delta_b] {
        write_snap(tmp.path(), snap);
    }

    let stats = collector(
        Arc::clone(&store),
        now,
        RetentionPolicy::LimitBased { max_backups: 1 },
    )
    .collect_once();

    // The oldest stream is gone entirely, the tip stream is untouched.
    assert_eq!(stats.fulls_deleted, 1);
    assert_eq!(stats.deltas_deleted, 1);
    assert_eq!(
        store.list().unwrap(),
        vec![tip_full, tip_delta_a, tip_delta_b]
    );
}

#[test]
fn exponential_thins_a_forty_day_backlog() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(LocalStore::open(tmp.path()).unwrap());
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();

    // One full per day at 06:00 UTC, today back through 40 days ago.
    let fulls: Vec<Snapshot> = (0..=40)
        .rev()
        .map(|age| {
            let created = Utc
                .with_ymd_and_hms(2024, 2, 1, 6, 0, 0)
                .unwrap()
                - Duration::days(age);
            Snapshot::full("backup-001", 0, (41 - age) as u64 * 100, created)
        })
        .collect();
    for snap in &fulls {
        write_snap(tmp.path(), snap);
    }

    let stats = collector(Arc::clone(&store), now, RetentionPolicy::Exponential)
        .collect_once();

    let survivors: Vec<chrono::NaiveDate> = store
        .list()
        .unwrap()
        .iter()
        .map(|s| s.created_on.date_naive())
        .collect();

    let date = |y, m, d| chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();
    let expected = vec![
        // One per 7-day span for four weeks, oldest first.
        date(2024, 1, 3),
        date(2024, 1, 10),
        date(2024, 1, 17),
        date(2024, 1, 24),
        // One per day for seven days.
        date(2024, 1, 25),
        date(2024, 1, 26),
        date(2024, 1, 27),
        date(2024, 1, 28),
        date(2024, 1, 29),
        date(2024, 1, 30),
        date(2024, 1, 31),
        // The latest stream head, always retained.
        date(2024, 2, 1),
    ];

    assert_eq!(survivors, expected);
    assert_eq!(stats.fulls_deleted, fulls.len() - expected.len());
    assert_eq!(stats.failures, 0);
}

#[test]
fn exponential_never_retains_more_than_the_bucket_capacity() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(LocalStore::open(tmp.path()).unwrap());
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();

    // Four snapshots per day for 60 days: far denser than the buckets.
    let mut snaps = Vec::new();
    let mut rev = 0u64;
    for age in (0..60).rev() {
        for hour in [0u32, 6, 12, 18] {
            let created = Utc
                .with_ymd_and_hms(2024, 2, 1, hour, 0, 0)
                .unwrap()
                - Duration::days(age);
            if created > now {
                continue;
            }
            snaps.push(Snapshot::full("backup-001", rev, rev + 100, created));
            rev += 100;
        }
    }
    for snap in &snaps {
        write_snap(tmp.path(), snap);
    }

    collector(Arc::clone(&store), now, RetentionPolicy::Exponential).collect_once();

    // At most one surviving head per hour/day/week bucket, plus the latest
    // stream and the current hour.
    let surviving = store.list().unwrap();
    assert!(
        surviving.len() <= (24 + 7 + 4) + 2,
        "survivors: {}",
        surviving.len()
    );
}

#[tokio::test(start_paused = true)]
async fn scheduler_prunes_store_then_honors_shutdown() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(LocalStore::open(tmp.path()).unwrap());
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

    let old = Snapshot::full("backup-001", 0, 100, now - Duration::hours(2));
    let tip = Snapshot::full("backup-001", 100, 200, now - Duration::hours(1));
    write_snap(tmp.path(), &old);
    write_snap(tmp.path(), &tip);

    let (tx, rx) = broadcast::channel(1);
    let gc = GarbageCollector::new(
        Arc::clone(&store) as Arc<dyn SnapshotStore>,
        Arc::new(FixedClock(now)),
        RetentionConfig {
            policy: RetentionPolicy::LimitBased { max_backups: 1 },
            period: StdDuration::from_secs(300),
        },
        rx,
    );
    let handle = tokio::spawn(gc.run());

    tokio::time::sleep(StdDuration::from_secs(301)).await;
    tx.send(()).unwrap();
    handle.await.unwrap();

    assert_eq!(store.list().unwrap(), vec![tip]);
}
