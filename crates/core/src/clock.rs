//! Injectable UTC clock
//!
//! The garbage collector reads the clock exactly once per collection pass and
//! derives every bucket boundary from that single value, so tests inject a
//! fixed clock to make retention decisions deterministic.

use chrono::{DateTime, Utc};

/// Source of "now" in UTC
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall clock used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant, for deterministic tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}
