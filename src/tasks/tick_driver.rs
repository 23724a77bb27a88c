//! Tick driver background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that recomputes every running timer once per interval
pub async fn tick_driver_task(state: Arc<AppState>, tick_interval: Duration) {
    info!("Starting tick driver task ({}ms interval)", tick_interval.as_millis());

    let mut interval = interval(tick_interval);
    // Deadlines come from wall-clock end timestamps, so missed ticks need no catch-up
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        match state.tick(state.now_ms()) {
            Ok(completions) if !completions.is_empty() => {
                debug!("Tick completed {} timer(s)", completions.len());
            }
            Ok(_) => {}
            Err(e) => error!("Failed to tick timers: {}", e),
        }
    }
}
