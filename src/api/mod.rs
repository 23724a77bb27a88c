//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", get(list_timers_handler))
        .route("/timers/:step_key", get(get_timer_handler).delete(stop_handler))
        .route("/timers/:step_key/start", post(start_handler))
        .route("/timers/:step_key/pause", post(pause_handler))
        .route("/timers/:step_key/resume", post(resume_handler))
        .route("/timers/:step_key/reset", post(reset_handler))
        .route("/lifecycle/resume", post(lifecycle_resume_handler))
        .route("/session/end", post(session_end_handler))
        .route("/durations/parse", post(parse_duration_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
