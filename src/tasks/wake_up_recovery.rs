//! Wake-up recovery background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{info, warn};

use crate::state::AppState;

/// How often the task compares wall-clock progress against its own schedule
pub const WAKE_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Detect a suspension gap between two wall-clock readings.
///
/// Returns the unexplained gap in milliseconds when more wall-clock time
/// passed than the expected interval plus `threshold_ms`.
pub fn detect_wake_gap(last_wall_ms: i64, now_ms: i64, expected_ms: i64, threshold_ms: i64) -> Option<i64> {
    let gap = now_ms - last_wall_ms - expected_ms;
    (gap > threshold_ms).then_some(gap)
}

/// Background task that notices the host was suspended and resynchronizes timers.
///
/// The monotonic interval stops while the machine sleeps but the wall clock
/// does not, so a large wall-clock jump between wakeups means we were suspended.
pub async fn wake_up_recovery_task(state: Arc<AppState>, threshold: Duration) {
    info!("Starting wake-up recovery task");

    let expected_ms = WAKE_CHECK_INTERVAL.as_millis() as i64;
    let threshold_ms = threshold.as_millis() as i64;
    let mut interval = interval(WAKE_CHECK_INTERVAL);
    let mut last_wall_ms = state.now_ms();

    loop {
        interval.tick().await;
        let now_ms = state.now_ms();

        if let Some(gap) = detect_wake_gap(last_wall_ms, now_ms, expected_ms, threshold_ms) {
            info!("Wake-up detected after ~{}s suspension, resynchronizing timers", gap / 1000);

            match state.resynchronize(now_ms) {
                Ok(completions) if !completions.is_empty() => {
                    info!("{} timer(s) finished while suspended", completions.len());
                }
                Ok(_) => {}
                Err(e) => warn!("Failed to resynchronize timers after wake-up: {}", e),
            }
        }

        last_wall_ms = now_ms;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_wakeups_are_not_suspensions() {
        assert_eq!(detect_wake_gap(0, 1_000, 1_000, 5_000), None);
        assert_eq!(detect_wake_gap(0, 3_500, 1_000, 5_000), None);
    }

    #[test]
    fn large_wall_clock_jump_is_a_suspension() {
        assert_eq!(detect_wake_gap(0, 501_000, 1_000, 5_000), Some(500_000));
    }

    #[test]
    fn wall_clock_moving_backwards_is_ignored() {
        assert_eq!(detect_wake_gap(10_000, 0, 1_000, 5_000), None);
    }
}
