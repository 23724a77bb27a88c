//! API request and response structures

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{TimerCompletion, TimerEntry, TimerStatus};

/// Body for POST /timers/:step_key/start
///
/// An explicit `duration_seconds` wins; otherwise the duration is detected from `text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartTimerRequest {
    pub duration_seconds: Option<i64>,
    pub text: Option<String>,
    pub label: Option<String>,
}

/// Body for POST /lifecycle/resume
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeRequest {
    /// Wall-clock time reported by the host, defaults to the server clock
    pub now_ms: Option<i64>,
}

/// Body for POST /durations/parse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseDurationRequest {
    pub text: String,
}

/// Timer entry as presented to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    pub step_key: String,
    pub label: String,
    pub status: TimerStatus,
    pub total_seconds: u64,
    pub remaining_seconds: u64,
    pub is_paused: bool,
    pub progress: f64,
    pub ends_at: Option<DateTime<Utc>>,
}

impl From<&TimerEntry> for TimerView {
    fn from(entry: &TimerEntry) -> Self {
        Self {
            step_key: entry.step_key.clone(),
            label: entry.label.clone(),
            status: entry.status(),
            total_seconds: entry.total_seconds,
            remaining_seconds: entry.remaining_seconds,
            is_paused: entry.is_paused,
            progress: entry.progress(),
            ends_at: entry.end_timestamp.and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        }
    }
}

/// Response for single-timer actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    /// `None` when the step had no timer (the action was a no-op)
    pub entry: Option<TimerView>,
}

impl TimerResponse {
    pub fn new(message: String, entry: Option<&TimerEntry>) -> Self {
        Self {
            message,
            timestamp: Utc::now(),
            entry: entry.map(TimerView::from),
        }
    }
}

/// Session overview for GET /timers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimersResponse {
    pub timers: Vec<TimerView>,
    /// One-time informational notice that background alerts may not fire
    pub background_alerts_degraded: bool,
    pub session_started_at: DateTime<Utc>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Response for POST /lifecycle/resume
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResyncResponse {
    pub completed: Vec<TimerCompletion>,
    pub timers: Vec<TimerView>,
}

/// Response for POST /session/end
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEndResponse {
    pub removed: usize,
    pub timestamp: DateTime<Utc>,
}

/// Response for POST /durations/parse
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseDurationResponse {
    pub text: String,
    pub seconds: Option<u64>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_view_from_running_entry() {
        let entry = TimerEntry::running("step-1".to_string(), "Simmer".to_string(), 60, 1_700_000_000_000);
        let view = TimerView::from(&entry);

        assert_eq!(view.status, TimerStatus::Running);
        assert_eq!(view.remaining_seconds, 60);
        assert_eq!(view.ends_at.map(|t| t.timestamp_millis()), Some(1_700_000_060_000));
    }

    #[test]
    fn start_request_fields_are_optional() {
        let request: StartTimerRequest = serde_json::from_str(r#"{"text": "boil 5 minutes"}"#).unwrap();
        assert_eq!(request.duration_seconds, None);
        assert_eq!(request.text.as_deref(), Some("boil 5 minutes"));
    }
}
