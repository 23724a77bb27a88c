//! Wall-clock sources for timer bookkeeping
//!
//! Every timer deadline is an absolute epoch-millisecond timestamp, so the
//! registry only ever asks "what time is it now" and never counts ticks.

use std::{
    fmt,
    sync::atomic::{AtomicI64, Ordering},
};
use chrono::Utc;

/// Source of the current wall-clock time in epoch milliseconds
pub trait Clock: Send + Sync + fmt::Debug {
    fn now_ms(&self) -> i64;
}

/// Clock backed by the system wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock, used to simulate suspension gaps
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self { now: AtomicI64::new(start_ms) }
    }

    pub fn set(&self, now_ms: i64) {
        self.now.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, delta_ms: i64) -> i64 {
        self.now.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }

    pub fn advance_secs(&self, secs: i64) -> i64 {
        self.advance_ms(secs * 1000)
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
