//! Timer registry: the concurrent per-step countdowns of one cook-mode session
//!
//! Remaining time is always recomputed from each entry's absolute end
//! timestamp, so a missed tick or a long suspension never introduces drift.
//! Local state is the source of truth; the notification scheduler is told
//! about every change but its failures only degrade background alerts.

use std::{collections::HashMap, sync::Arc};
use tracing::{debug, info, warn};

use super::{TimerCompletion, TimerEntry};
use crate::{
    error::{SchedulerError, TimerError},
    services::NotificationScheduler,
    utils::Clock,
};

/// Longest countdown accepted by `start` (seven days, enough for a long ferment)
pub const MAX_DURATION_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Owns every timer entry for a single cook-mode session
#[derive(Debug)]
pub struct TimerRegistry {
    entries: HashMap<String, TimerEntry>,
    scheduler: Arc<dyn NotificationScheduler>,
    clock: Arc<dyn Clock>,
    scheduler_degraded: bool,
}

impl TimerRegistry {
    pub fn new(scheduler: Arc<dyn NotificationScheduler>, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            scheduler,
            clock,
            scheduler_degraded: false,
        }
    }

    /// Label used for notifications when the caller does not supply one
    pub fn default_label(step_key: &str) -> String {
        format!("Timer for {} is done", step_key)
    }

    /// Start a countdown for `step_key`, replacing any existing one
    pub fn start(&mut self, step_key: &str, duration_seconds: i64) -> Result<TimerEntry, TimerError> {
        self.start_with_label(step_key, duration_seconds, Self::default_label(step_key))
    }

    pub fn start_with_label(
        &mut self,
        step_key: &str,
        duration_seconds: i64,
        label: impl Into<String>,
    ) -> Result<TimerEntry, TimerError> {
        let now = self.clock.now_ms();
        let end_in_range = duration_seconds
            .checked_mul(1000)
            .and_then(|ms| now.checked_add(ms))
            .is_some();

        if duration_seconds <= 0 || duration_seconds > MAX_DURATION_SECONDS || !end_in_range {
            debug!("Rejecting timer for {} with duration {}", step_key, duration_seconds);
            return Err(TimerError::InvalidDuration(duration_seconds));
        }

        let entry = TimerEntry::running(step_key.to_string(), label.into(), duration_seconds as u64, now);
        let replaced = self.entries.insert(step_key.to_string(), entry.clone()).is_some();

        info!("Started {}s timer for {}{}", duration_seconds, step_key,
              if replaced { " (replaced existing timer)" } else { "" });

        let fire_at = entry.end_timestamp.unwrap_or(now);
        let result = if replaced {
            self.scheduler.reschedule(step_key, fire_at, &entry.label)
        } else {
            self.scheduler.schedule(step_key, fire_at, &entry.label)
        };
        self.note_scheduler_result("schedule", step_key, result);

        Ok(entry)
    }

    /// Freeze a running countdown. Returns `None` if no timer exists for the step.
    pub fn pause(&mut self, step_key: &str) -> Option<TimerEntry> {
        let now = self.clock.now_ms();
        let Some(entry) = self.entries.get_mut(step_key) else {
            debug!("Pause ignored, no timer for {}", step_key);
            return None;
        };

        if entry.is_paused || entry.is_completed() {
            debug!("Pause ignored for {} ({:?})", step_key, entry.status());
            return Some(entry.clone());
        }

        entry.remaining_seconds = entry.remaining_at(now);
        if entry.is_completed() {
            // Already at zero: completed, not pausable. The next tick raises the signal.
            debug!("Timer for {} reached zero before pause", step_key);
            return Some(entry.clone());
        }

        entry.is_paused = true;
        entry.end_timestamp = None;
        let snapshot = entry.clone();
        info!("Paused timer for {} with {}s remaining", step_key, snapshot.remaining_seconds);

        let result = self.scheduler.cancel(step_key);
        self.note_scheduler_result("cancel", step_key, result);

        Some(snapshot)
    }

    /// Continue a paused countdown from its frozen remaining time
    pub fn resume(&mut self, step_key: &str) -> Option<TimerEntry> {
        let now = self.clock.now_ms();
        let Some(entry) = self.entries.get_mut(step_key) else {
            debug!("Resume ignored, no timer for {}", step_key);
            return None;
        };

        if !entry.is_paused {
            debug!("Resume ignored for {} ({:?})", step_key, entry.status());
            return Some(entry.clone());
        }

        entry.run_from(now);
        let snapshot = entry.clone();
        info!("Resumed timer for {} with {}s remaining", step_key, snapshot.remaining_seconds);

        self.reschedule(&snapshot, now);
        Some(snapshot)
    }

    /// Restore the full duration and start counting again
    pub fn reset(&mut self, step_key: &str) -> Option<TimerEntry> {
        let now = self.clock.now_ms();
        let Some(entry) = self.entries.get_mut(step_key) else {
            debug!("Reset ignored, no timer for {}", step_key);
            return None;
        };

        entry.remaining_seconds = entry.total_seconds;
        entry.completion_signalled = false;
        entry.run_from(now);
        let snapshot = entry.clone();
        info!("Reset timer for {} to {}s", step_key, snapshot.total_seconds);

        self.reschedule(&snapshot, now);
        Some(snapshot)
    }

    /// Remove the timer for `step_key`, returning the removed entry
    pub fn stop(&mut self, step_key: &str) -> Option<TimerEntry> {
        // Local state goes first so a failed cancel never leaves a stopped timer visible
        let Some(removed) = self.entries.remove(step_key) else {
            debug!("Stop ignored, no timer for {}", step_key);
            return None;
        };
        info!("Stopped timer for {}", step_key);

        let result = self.scheduler.cancel(step_key);
        self.note_scheduler_result("cancel", step_key, result);

        Some(removed)
    }

    /// Periodic recomputation, called once per second by the tick driver
    pub fn tick(&mut self, now_ms: i64) -> Vec<TimerCompletion> {
        let completions = self.recompute(now_ms);
        if !completions.is_empty() {
            debug!("Tick at {} completed {} timer(s)", now_ms, completions.len());
        }
        completions
    }

    /// Recompute after the host regains the foreground.
    ///
    /// Produces the same state as ticking every second through the suspension.
    pub fn resynchronize(&mut self, now_ms: i64) -> Vec<TimerCompletion> {
        let completions = self.recompute(now_ms);
        info!("Resynchronized {} timer(s) at {}, {} completed while suspended",
              self.entries.len(), now_ms, completions.len());
        completions
    }

    /// Tear down the session: drop every entry and cancel its notification
    pub fn end_session(&mut self) -> usize {
        let keys: Vec<String> = self.entries.drain().map(|(key, _)| key).collect();
        for key in &keys {
            let result = self.scheduler.cancel(key);
            self.note_scheduler_result("cancel", key, result);
        }

        if !keys.is_empty() {
            info!("Cook-mode session ended, removed {} timer(s)", keys.len());
        }
        keys.len()
    }

    pub fn get(&self, step_key: &str) -> Option<&TimerEntry> {
        self.entries.get(step_key)
    }

    /// All entries, ordered by step key
    pub fn entries(&self) -> Vec<TimerEntry> {
        let mut entries: Vec<TimerEntry> = self.entries.values().cloned().collect();
        entries.sort_by(|a, b| a.step_key.cmp(&b.step_key));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once any scheduler call has failed during this session
    pub fn background_alerts_degraded(&self) -> bool {
        self.scheduler_degraded
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    fn recompute(&mut self, now_ms: i64) -> Vec<TimerCompletion> {
        let mut completions = Vec::new();

        for entry in self.entries.values_mut() {
            if entry.is_paused || entry.completion_signalled {
                continue;
            }

            entry.remaining_seconds = entry.remaining_at(now_ms);
            if entry.remaining_seconds == 0 {
                entry.completion_signalled = true;
                completions.push(TimerCompletion {
                    step_key: entry.step_key.clone(),
                    label: entry.label.clone(),
                    total_seconds: entry.total_seconds,
                    ended_at_ms: entry.end_timestamp.unwrap_or(now_ms),
                    detected_at_ms: now_ms,
                });
            }
        }

        completions.sort_by(|a, b| a.step_key.cmp(&b.step_key));
        for completion in &completions {
            info!("Timer for {} completed", completion.step_key);
        }
        completions
    }

    fn reschedule(&mut self, entry: &TimerEntry, now_ms: i64) {
        let fire_at = entry.end_timestamp.unwrap_or(now_ms);
        let result = self.scheduler.reschedule(&entry.step_key, fire_at, &entry.label);
        self.note_scheduler_result("reschedule", &entry.step_key, result);
    }

    fn note_scheduler_result<T>(&mut self, action: &str, step_key: &str, result: Result<T, SchedulerError>) {
        match result {
            Ok(_) => debug!("Notification {} succeeded for {}", action, step_key),
            Err(e) if !self.scheduler_degraded => {
                warn!("Background alerts degraded, notification {} failed for {}: {}", action, step_key, e);
                self.scheduler_degraded = true;
            }
            Err(e) => debug!("Notification {} failed for {}: {}", action, step_key, e),
        }
    }
}

impl Drop for TimerRegistry {
    fn drop(&mut self) {
        self.end_session();
    }
}
