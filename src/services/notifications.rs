//! Background notification scheduling
//!
//! A scheduler announces a finished timer even when nobody is watching the
//! countdown. Scheduling is best-effort: the registry logs failures and keeps
//! counting.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use serde::Serialize;
use tokio::{process::Command, runtime::Handle, task::JoinHandle, time::sleep};
use tracing::{debug, info, warn};

use crate::{error::SchedulerError, utils::Clock};

/// Title used for desktop notifications
pub const NOTIFICATION_TITLE: &str = "Cook timer";

/// Longest single sleep while waiting for a deadline.
///
/// Tokio's timer is monotonic and stops while the host is suspended, so the
/// wall clock is re-read at least this often.
pub const WALL_CLOCK_POLL: Duration = Duration::from_secs(1);

/// Handle describing a scheduled notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleHandle {
    pub id: u64,
    pub step_key: String,
    pub fire_at_ms: i64,
}

/// Schedules a notification to fire at an absolute time for a step
pub trait NotificationScheduler: Send + Sync + fmt::Debug {
    fn schedule(&self, step_key: &str, fire_at_ms: i64, label: &str) -> Result<ScheduleHandle, SchedulerError>;

    /// Cancel the pending notification for `step_key`, if any
    fn cancel(&self, step_key: &str) -> Result<(), SchedulerError>;

    fn reschedule(&self, step_key: &str, fire_at_ms: i64, label: &str) -> Result<ScheduleHandle, SchedulerError> {
        if let Err(e) = self.cancel(step_key) {
            debug!("Cancel before reschedule failed for {}: {}", step_key, e);
        }
        self.schedule(step_key, fire_at_ms, label)
    }
}

/// Scheduler used when background notifications are disabled or unsupported
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopScheduler;

impl NotificationScheduler for NoopScheduler {
    fn schedule(&self, _step_key: &str, _fire_at_ms: i64, _label: &str) -> Result<ScheduleHandle, SchedulerError> {
        Err(SchedulerError::Unavailable("background notifications are disabled".to_string()))
    }

    fn cancel(&self, _step_key: &str) -> Result<(), SchedulerError> {
        Ok(())
    }
}

/// How long to sleep before re-reading the wall clock, or `None` once the
/// deadline has passed
pub fn next_wait(fire_at_ms: i64, now_ms: i64, max_step: Duration) -> Option<Duration> {
    let remaining_ms = fire_at_ms.checked_sub(now_ms)?;
    if remaining_ms <= 0 {
        return None;
    }
    Some(Duration::from_millis(remaining_ms as u64).min(max_step))
}

/// Wait until the wall clock reaches `fire_at_ms`, however long the host sleeps
pub async fn wait_until(clock: &dyn Clock, fire_at_ms: i64, max_step: Duration) {
    while let Some(wait) = next_wait(fire_at_ms, clock.now_ms(), max_step) {
        sleep(wait).await;
    }
}

/// Scheduler that spawns one delayed tokio task per step and runs a desktop
/// notification command when the wall-clock deadline passes
#[derive(Debug)]
pub struct TokioNotificationScheduler {
    runtime: Handle,
    clock: Arc<dyn Clock>,
    command: String,
    poll_interval: Duration,
    pending: Mutex<HashMap<String, JoinHandle<()>>>,
    next_id: AtomicU64,
}

impl TokioNotificationScheduler {
    pub fn new(runtime: Handle, clock: Arc<dyn Clock>, command: impl Into<String>) -> Self {
        Self {
            runtime,
            clock,
            command: command.into(),
            poll_interval: WALL_CLOCK_POLL,
            pending: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Build a scheduler on the current tokio runtime
    pub fn try_current(clock: Arc<dyn Clock>, command: impl Into<String>) -> Result<Self, SchedulerError> {
        let runtime = Handle::try_current()
            .map_err(|e| SchedulerError::Unavailable(format!("no tokio runtime: {}", e)))?;
        Ok(Self::new(runtime, clock, command))
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    /// Number of notifications that have not fired or been cancelled yet
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .map(|pending| pending.values().filter(|task| !task.is_finished()).count())
            .unwrap_or(0)
    }
}

impl NotificationScheduler for TokioNotificationScheduler {
    fn schedule(&self, step_key: &str, fire_at_ms: i64, label: &str) -> Result<ScheduleHandle, SchedulerError> {
        let mut pending = self.pending.lock()
            .map_err(|e| SchedulerError::Failed(format!("Failed to lock pending notifications: {}", e)))?;

        pending.retain(|_, task| !task.is_finished());
        if let Some(previous) = pending.remove(step_key) {
            previous.abort();
        }

        let delay_ms = (fire_at_ms - self.clock.now_ms()).max(0);
        let clock = Arc::clone(&self.clock);
        let poll_interval = self.poll_interval;
        let command = self.command.clone();
        let body = label.to_string();
        let key = step_key.to_string();

        let task = self.runtime.spawn(async move {
            wait_until(clock.as_ref(), fire_at_ms, poll_interval).await;
            info!("Timer notification firing for {}", key);
            if let Err(e) = send_desktop_notification(&command, NOTIFICATION_TITLE, &body).await {
                warn!("Failed to deliver notification for {}: {}", key, e);
            }
        });
        pending.insert(step_key.to_string(), task);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("Scheduled notification {} for {} in {}ms", id, step_key, delay_ms);

        Ok(ScheduleHandle {
            id,
            step_key: step_key.to_string(),
            fire_at_ms,
        })
    }

    fn cancel(&self, step_key: &str) -> Result<(), SchedulerError> {
        let mut pending = self.pending.lock()
            .map_err(|e| SchedulerError::Failed(format!("Failed to lock pending notifications: {}", e)))?;

        if let Some(task) = pending.remove(step_key) {
            task.abort();
            debug!("Cancelled notification for {}", step_key);
        }
        Ok(())
    }
}

impl Drop for TokioNotificationScheduler {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            for (_, task) in pending.drain() {
                task.abort();
            }
        }
    }
}

/// Run `command <title> <body>` (e.g. notify-send)
pub async fn send_desktop_notification(command: &str, title: &str, body: &str) -> Result<(), String> {
    let output = Command::new(command)
        .args([title, body])
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", command, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", command, stderr));
    }

    Ok(())
}
