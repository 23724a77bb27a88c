//! Completion alert background task

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{services::CompletionAlert, state::AppState};

/// Background task that plays the local alert for every completed timer
pub async fn completion_alert_task(state: Arc<AppState>, alert: CompletionAlert) {
    info!("Starting completion alert task");

    let mut completion_rx = state.completion_tx.subscribe();

    loop {
        match completion_rx.recv().await {
            Ok(completion) => {
                if let Err(e) = alert.play(&completion).await {
                    warn!("Failed to play alert for {}: {}", completion.step_key, e);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Completion alert task lagged, {} alert(s) skipped", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Completion channel closed, stopping alert task");
                break;
            }
        }
    }
}
