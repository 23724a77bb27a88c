//! Timer entry structure and per-step countdown state

use serde::{Deserialize, Serialize};

/// Derived lifecycle state of a timer entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Running,
    Paused,
    Completed,
}

/// Countdown for a single cooking step.
///
/// While running, `end_timestamp` is authoritative and `remaining_seconds` is a
/// cached display value. While paused, `remaining_seconds` is authoritative and
/// `end_timestamp` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerEntry {
    pub step_key: String,
    pub label: String,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub is_paused: bool,
    /// Epoch milliseconds at which the countdown reaches zero
    pub end_timestamp: Option<i64>,
    #[serde(skip)]
    pub(crate) completion_signalled: bool,
}

impl TimerEntry {
    /// Create a running entry that ends `total_seconds` after `now_ms`
    pub fn running(step_key: String, label: String, total_seconds: u64, now_ms: i64) -> Self {
        Self {
            step_key,
            label,
            total_seconds,
            remaining_seconds: total_seconds,
            is_paused: false,
            end_timestamp: Some(end_timestamp_from(now_ms, total_seconds)),
            completion_signalled: false,
        }
    }

    pub fn status(&self) -> TimerStatus {
        if self.remaining_seconds == 0 {
            TimerStatus::Completed
        } else if self.is_paused {
            TimerStatus::Paused
        } else {
            TimerStatus::Running
        }
    }

    pub fn is_running(&self) -> bool {
        self.status() == TimerStatus::Running
    }

    pub fn is_completed(&self) -> bool {
        self.remaining_seconds == 0
    }

    /// Fraction of the countdown elapsed, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        if self.total_seconds == 0 {
            return 1.0;
        }
        1.0 - self.remaining_seconds as f64 / self.total_seconds as f64
    }

    /// Remaining whole seconds at `now_ms`, derived from the end timestamp.
    ///
    /// Paused entries return their frozen value.
    pub fn remaining_at(&self, now_ms: i64) -> u64 {
        match (self.is_paused, self.end_timestamp) {
            (false, Some(end)) => {
                let remaining = (end - now_ms).max(0) / 1000;
                (remaining as u64).min(self.total_seconds)
            }
            _ => self.remaining_seconds,
        }
    }

    /// Restart the countdown from `now_ms` with `remaining_seconds` left
    pub(crate) fn run_from(&mut self, now_ms: i64) {
        self.is_paused = false;
        self.end_timestamp = Some(end_timestamp_from(now_ms, self.remaining_seconds));
    }
}

/// Completion signal raised once when a countdown crosses zero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerCompletion {
    pub step_key: String,
    pub label: String,
    pub total_seconds: u64,
    /// When the countdown actually reached zero
    pub ended_at_ms: i64,
    /// When the registry noticed (later than `ended_at_ms` after a suspension)
    pub detected_at_ms: i64,
}

fn end_timestamp_from(now_ms: i64, seconds: u64) -> i64 {
    now_ms.saturating_add((seconds as i64).saturating_mul(1000))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(total: u64) -> TimerEntry {
        TimerEntry::running("step-1".to_string(), "Simmer".to_string(), total, 0)
    }

    #[test]
    fn remaining_floors_partial_seconds() {
        let entry = entry(90);
        assert_eq!(entry.end_timestamp, Some(90_000));
        assert_eq!(entry.remaining_at(0), 90);
        assert_eq!(entry.remaining_at(500), 89);
        assert_eq!(entry.remaining_at(30_000), 60);
        assert_eq!(entry.remaining_at(200_000), 0);
    }

    #[test]
    fn remaining_never_exceeds_total() {
        // clock stepped backwards
        assert_eq!(entry(10).remaining_at(-60_000), 10);
    }

    #[test]
    fn paused_entry_is_frozen() {
        let mut entry = entry(60);
        entry.remaining_seconds = 50;
        entry.is_paused = true;
        entry.end_timestamp = None;

        assert_eq!(entry.remaining_at(1_000_000), 50);
        assert_eq!(entry.status(), TimerStatus::Paused);
    }

    #[test]
    fn status_and_progress() {
        let mut entry = entry(100);
        assert_eq!(entry.status(), TimerStatus::Running);
        assert_eq!(entry.progress(), 0.0);

        entry.remaining_seconds = 25;
        assert!((entry.progress() - 0.75).abs() < f64::EPSILON);

        entry.remaining_seconds = 0;
        assert_eq!(entry.status(), TimerStatus::Completed);
        assert!(entry.is_completed());
        assert!(!entry.is_running());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&TimerStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
