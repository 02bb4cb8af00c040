//! Time source used to stamp creation and registration dates.

use super::record::Timestamp;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of "now" in milliseconds since the Unix epoch
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now_millis(&self) -> Timestamp;
}

/// Wall clock backed by `chrono`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Timestamp {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for deterministic tests and replays
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: Timestamp) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn set(&self, now_ms: Timestamp) {
        self.now_ms.store(now_ms, Ordering::Release);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Timestamp {
        self.now_ms.load(Ordering::Acquire)
    }
}
