//! Cook Timers - drift-free countdown timers for a cook-mode session
//! 
//! This is the main entry point for the cook-timers server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use cook_timers::{
    api::create_router,
    config::Config,
    services::{CompletionAlert, NoopScheduler, NotificationScheduler, TokioNotificationScheduler},
    state::AppState,
    tasks::{completion_alert_task, tick_driver_task, wake_up_recovery_task},
    utils::{shutdown_signal, Clock, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("cook_timers={},tower_http=info", config.log_level()))
        .init();

    info!("Starting cook-timers server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms, wake_threshold={}s",
          config.host, config.port, config.tick_ms, config.wake_threshold_secs);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let scheduler: Arc<dyn NotificationScheduler> = if config.no_notifications {
        info!("Background notifications disabled");
        Arc::new(NoopScheduler)
    } else {
        match TokioNotificationScheduler::try_current(Arc::clone(&clock), config.notify_command.clone()) {
            Ok(scheduler) => Arc::new(scheduler),
            Err(e) => {
                warn!("{}, background alerts will not fire", e);
                Arc::new(NoopScheduler)
            }
        }
    };

    // One cook-mode session per server process
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        scheduler,
        clock,
    ));

    let tick_state = Arc::clone(&state);
    let tick_interval = config.tick_interval();
    tokio::spawn(async move {
        tick_driver_task(tick_state, tick_interval).await;
    });

    let wake_state = Arc::clone(&state);
    let wake_threshold = config.wake_threshold();
    tokio::spawn(async move {
        wake_up_recovery_task(wake_state, wake_threshold).await;
    });

    let alert_state = Arc::clone(&state);
    let alert = CompletionAlert::new(config.alert_command.clone());
    tokio::spawn(async move {
        completion_alert_task(alert_state, alert).await;
    });

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timers/:step_key/start  - Start a step timer");
    info!("  POST   /timers/:step_key/pause  - Pause a step timer");
    info!("  POST   /timers/:step_key/resume - Resume a step timer");
    info!("  POST   /timers/:step_key/reset  - Reset a step timer");
    info!("  DELETE /timers/:step_key        - Stop a step timer");
    info!("  GET    /timers                  - List timers");
    info!("  POST   /lifecycle/resume        - Resynchronize after suspension");
    info!("  POST   /session/end             - End the cook-mode session");
    info!("  POST   /durations/parse         - Detect a duration in step text");
    info!("  GET    /health                  - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to install signal handler: {}", e),
            }
        }
    }

    // Cancel every pending notification before exiting
    if let Err(e) = state.end_session() {
        warn!("Failed to end session cleanly: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
