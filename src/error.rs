//! Error types and handling
//!
//! Unknown step keys are never errors: pause/resume/reset/stop on a missing
//! timer are silent no-ops. Only invalid input and a poisoned registry surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by timer operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Invalid duration: {0} seconds (must be greater than zero)")]
    InvalidDuration(i64),

    #[error("No timer duration found in step text")]
    NoDurationFound,

    #[error("Failed to lock timer registry: {0}")]
    StateUnavailable(String),
}

/// Errors reported by a notification scheduler.
///
/// These never propagate out of the registry; they only degrade background alerts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Notification scheduler unavailable: {0}")]
    Unavailable(String),

    #[error("Notification scheduling failed: {0}")]
    Failed(String),
}

/// Error body returned to HTTP clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<TimerError> for ErrorResponse {
    fn from(error: TimerError) -> Self {
        let code = match &error {
            TimerError::InvalidDuration(_) => "INVALID_DURATION",
            TimerError::NoDurationFound => "NO_DURATION_FOUND",
            TimerError::StateUnavailable(_) => "STATE_UNAVAILABLE",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_codes() {
        let response = ErrorResponse::from(TimerError::InvalidDuration(-5));
        assert_eq!(response.code, "INVALID_DURATION");
        assert!(response.message.contains("-5"));

        let response = ErrorResponse::from(TimerError::NoDurationFound);
        assert_eq!(response.code, "NO_DURATION_FOUND");
    }
}
