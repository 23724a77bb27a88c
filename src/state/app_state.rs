//! Cook-mode session state shared between the HTTP API and background tasks

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{TimerCompletion, TimerEntry, TimerRegistry};
use crate::{error::TimerError, services::NotificationScheduler, utils::Clock};

/// One cook-mode session: the timer registry plus the channels that fan its
/// changes out to the UI and the alert task
#[derive(Debug)]
pub struct AppState {
    /// Timers for the current session
    pub registry: Arc<Mutex<TimerRegistry>>,
    pub clock: Arc<dyn Clock>,
    /// Server metadata
    pub start_time: Instant,
    pub session_started_at: DateTime<Utc>,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Completion signals, one per countdown reaching zero
    pub completion_tx: broadcast::Sender<TimerCompletion>,
    /// Snapshot of every timer after each change
    pub timer_update_tx: watch::Sender<Vec<TimerEntry>>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<Vec<TimerEntry>>,
}

impl AppState {
    pub fn new(port: u16, host: String, scheduler: Arc<dyn NotificationScheduler>, clock: Arc<dyn Clock>) -> Self {
        let (completion_tx, _) = broadcast::channel(100);
        let (timer_update_tx, timer_update_rx) = watch::channel(Vec::new());

        Self {
            registry: Arc::new(Mutex::new(TimerRegistry::new(scheduler, Arc::clone(&clock)))),
            clock,
            start_time: Instant::now(),
            session_started_at: Utc::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            completion_tx,
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Run `op` against the registry, then publish the new snapshot.
    ///
    /// `action` is recorded as the last user action when present.
    fn with_registry<F, T>(&self, action: Option<&str>, op: F) -> Result<T, TimerError>
    where
        F: FnOnce(&mut TimerRegistry) -> T,
    {
        let mut registry = self.registry.lock()
            .map_err(|e| TimerError::StateUnavailable(e.to_string()))?;

        let result = op(&mut *registry);
        let snapshot = registry.entries();
        drop(registry); // Release the lock early

        if let Some(action) = action {
            if let Ok(mut last_action) = self.last_action.lock() {
                *last_action = Some(action.to_string());
            }
            if let Ok(mut last_time) = self.last_action_time.lock() {
                *last_time = Some(Utc::now());
            }
        }

        if let Err(e) = self.timer_update_tx.send(snapshot) {
            warn!("Failed to send timer update: {}", e);
        }

        Ok(result)
    }

    fn publish_completions(&self, completions: &[TimerCompletion]) {
        for completion in completions {
            if self.completion_tx.send(completion.clone()).is_err() {
                debug!("No completion listeners for {}", completion.step_key);
            }
        }
    }

    pub fn start_timer(&self, step_key: &str, duration_seconds: i64, label: Option<String>) -> Result<TimerEntry, TimerError> {
        let label = label.unwrap_or_else(|| TimerRegistry::default_label(step_key));
        self.with_registry(Some(&format!("start {}", step_key)), |registry| {
            registry.start_with_label(step_key, duration_seconds, label)
        })?
    }

    pub fn pause_timer(&self, step_key: &str) -> Result<Option<TimerEntry>, TimerError> {
        self.with_registry(Some(&format!("pause {}", step_key)), |registry| registry.pause(step_key))
    }

    pub fn resume_timer(&self, step_key: &str) -> Result<Option<TimerEntry>, TimerError> {
        self.with_registry(Some(&format!("resume {}", step_key)), |registry| registry.resume(step_key))
    }

    pub fn reset_timer(&self, step_key: &str) -> Result<Option<TimerEntry>, TimerError> {
        self.with_registry(Some(&format!("reset {}", step_key)), |registry| registry.reset(step_key))
    }

    pub fn stop_timer(&self, step_key: &str) -> Result<Option<TimerEntry>, TimerError> {
        self.with_registry(Some(&format!("stop {}", step_key)), |registry| registry.stop(step_key))
    }

    /// Periodic tick; completions are broadcast to listeners
    pub fn tick(&self, now_ms: i64) -> Result<Vec<TimerCompletion>, TimerError> {
        let completions = self.with_registry(None, |registry| registry.tick(now_ms))?;
        self.publish_completions(&completions);
        Ok(completions)
    }

    /// Host lifecycle signal: the process is back in the foreground
    pub fn resynchronize(&self, now_ms: i64) -> Result<Vec<TimerCompletion>, TimerError> {
        let completions = self.with_registry(Some("resynchronize"), |registry| registry.resynchronize(now_ms))?;
        self.publish_completions(&completions);
        Ok(completions)
    }

    /// Tear down every timer in the session
    pub fn end_session(&self) -> Result<usize, TimerError> {
        let removed = self.with_registry(Some("end session"), |registry| registry.end_session())?;
        info!("Session ended with {} timer(s) removed", removed);
        Ok(removed)
    }

    pub fn get_timer(&self, step_key: &str) -> Result<Option<TimerEntry>, TimerError> {
        self.registry.lock()
            .map(|registry| registry.get(step_key).cloned())
            .map_err(|e| TimerError::StateUnavailable(e.to_string()))
    }

    pub fn list_timers(&self) -> Result<Vec<TimerEntry>, TimerError> {
        self.registry.lock()
            .map(|registry| registry.entries())
            .map_err(|e| TimerError::StateUnavailable(e.to_string()))
    }

    pub fn background_alerts_degraded(&self) -> bool {
        self.registry.lock()
            .map(|registry| registry.background_alerts_degraded())
            .unwrap_or(false)
    }

    /// Calculate session length as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
