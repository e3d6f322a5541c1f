//! Retention policy configuration and the exponential bucket walk
//!
//! The exponential policy thins the backup log by age: every snapshot in the
//! current hour, then one per hour for 24 hours, one per day for 7 days, one
//! per 7-day span for 4 weeks, nothing older. The walk over stream heads is
//! a state machine carrying `(mode, bucket_count)` from newest to oldest, so
//! a single snapshot may fall through several modes before it resolves.

use anyhow::bail;
use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Duration as StdDuration;

/// Number of one-hour buckets retained after the current hour
pub const HOUR_BUCKETS: i64 = 24;
/// Number of one-day buckets retained after the hourly window
pub const DAY_BUCKETS: i64 = 7;
/// Number of 7-day buckets retained after the daily window
pub const WEEK_BUCKETS: i64 = 4;

/// How the garbage collector decides which full snapshots to retain
///
/// The serialized identifiers are exactly `Exponential` and `LimitBased`,
/// case-sensitive; anything else is a configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionPolicy {
    /// Fixed time buckets thinning with age (see module docs)
    Exponential,
    /// Keep the most recent `max_backups` snapshot streams
    LimitBased { max_backups: u32 },
}

/// Full garbage collector configuration
#[derive(Debug, Clone)]
pub struct RetentionConfig {
    pub policy: RetentionPolicy,
    /// Sleep between collection passes
    pub period: StdDuration,
}

impl RetentionConfig {
    /// Reject configurations the collector must not start with
    pub fn validate(&self) -> anyhow::Result<()> {
        if let RetentionPolicy::LimitBased { max_backups } = self.policy {
            if max_backups == 0 {
                bail!("max_backups must be at least 1");
            }
        }
        if self.period.is_zero() {
            bail!("garbage collection period must be non-zero");
        }
        Ok(())
    }
}

/// Decision for one stream head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Delete,
}

/// Age band the walk is currently assigning buckets from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketMode {
    Current,
    Hour,
    Day,
    Week,
    Month,
}

/// Stateful newest-to-oldest walk over stream heads for the exponential
/// policy
///
/// Feed creation times in descending order; each call returns whether that
/// head full is retained. The first snapshot encountered in a bucket is the
/// newest one in it and claims the bucket; older snapshots landing in a
/// claimed bucket are deleted.
#[derive(Debug)]
pub struct RetentionWalk {
    now: DateTime<Utc>,
    mode: BucketMode,
    bucket_count: i64,
}

impl RetentionWalk {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            mode: BucketMode::Current,
            bucket_count: -1,
        }
    }

    /// Resolve one stream head to keep or delete, advancing bucket state
    pub fn step(&mut self, created_on: DateTime<Utc>) -> Verdict {
        // A snapshot older than every remaining bucket of the current mode
        // carries over into the next mode and is re-evaluated there.
        loop {
            match self.mode {
                BucketMode::Current => {
                    if hour_floor(created_on) == hour_floor(self.now) {
                        return Verdict::Keep;
                    }
                    self.enter(BucketMode::Hour, created_on);
                }

                BucketMode::Hour => {
                    let snap_hour = hour_floor(created_on);
                    while self.bucket_count >= 0 {
                        let anchor = self.hour_anchor();
                        match anchor.cmp(&snap_hour) {
                            Ordering::Equal => {
                                self.claim_bucket(BucketMode::Day, created_on);
                                return Verdict::Keep;
                            }
                            // No snapshot fell into this hour; try the next
                            // older anchor against the same snapshot.
                            Ordering::Greater => self.bucket_count -= 1,
                            // Snapshot is newer than any remaining hour
                            // bucket: its bucket was already claimed.
                            Ordering::Less => return Verdict::Delete,
                        }
                    }
                    self.enter(BucketMode::Day, created_on);
                }

                BucketMode::Day => {
                    let snap_day = created_on.date_naive();
                    while self.bucket_count >= 0 {
                        let anchor = self.day_anchor();
                        match anchor.cmp(&snap_day) {
                            Ordering::Equal => {
                                self.claim_bucket(BucketMode::Week, created_on);
                                return Verdict::Keep;
                            }
                            Ordering::Greater => self.bucket_count -= 1,
                            Ordering::Less => return Verdict::Delete,
                        }
                    }
                    self.enter(BucketMode::Week, created_on);
                }

                BucketMode::Week => {
                    // Rolling 7-day spans anchored at now - 14, now - 21,
                    // now - 28, now - 35 days; a snapshot belongs to the span
                    // [anchor, anchor + 7d).
                    let snap_day = created_on.date_naive();
                    while self.bucket_count >= 0 {
                        let anchor = self.week_anchor();
                        if snap_day < anchor {
                            self.bucket_count -= 1;
                        } else if snap_day < anchor + Duration::days(7) {
                            self.claim_bucket(BucketMode::Month, created_on);
                            return Verdict::Keep;
                        } else {
                            return Verdict::Delete;
                        }
                    }
                    self.enter(BucketMode::Month, created_on);
                }

                BucketMode::Month => return Verdict::Delete,
            }
        }
    }

    /// Hour bucket anchor: `bucket_count`:00 on now's date
    fn hour_anchor(&self) -> DateTime<Utc> {
        self.now
            .date_naive()
            .and_hms_opt(self.bucket_count as u32, 0, 0)
            .expect("bucket_count is a wall-clock hour")
            .and_utc()
    }

    /// Day bucket anchor: midnight, 7 - `bucket_count` days before now
    fn day_anchor(&self) -> NaiveDate {
        self.now.date_naive() - Duration::days(DAY_BUCKETS - self.bucket_count)
    }

    /// Week span anchor: midnight opening the 7-day span
    fn week_anchor(&self) -> NaiveDate {
        self.now.date_naive()
            - Duration::days(DAY_BUCKETS + 7 * (WEEK_BUCKETS - self.bucket_count))
    }

    /// Consume the matched bucket; on exhaustion move to the next mode
    fn claim_bucket(&mut self, next: BucketMode, created_on: DateTime<Utc>) {
        self.bucket_count -= 1;
        if self.bucket_count < 0 {
            self.enter(next, created_on);
        }
    }

    fn enter(&mut self, mode: BucketMode, created_on: DateTime<Utc>) {
        tracing::info!("GC: switching to {:?} mode for snapshot {}", mode, created_on);
        self.bucket_count = match mode {
            BucketMode::Hour => HOUR_BUCKETS - 1,
            BucketMode::Day => DAY_BUCKETS - 1,
            BucketMode::Week => WEEK_BUCKETS - 1,
            BucketMode::Current | BucketMode::Month => -1,
        };
        self.mode = mode;
    }
}

fn hour_floor(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.date_naive()
        .and_hms_opt(ts.hour(), 0, 0)
        .expect("hour of an existing timestamp")
        .and_utc()
}
