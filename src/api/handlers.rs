//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    error::{ErrorResponse, TimerError},
    parsing::parse_duration,
    state::{AppState, TimerEntry},
};
use super::responses::{
    HealthResponse, ParseDurationRequest, ParseDurationResponse, ResumeRequest, ResyncResponse,
    SessionEndResponse, StartTimerRequest, TimerResponse, TimerView, TimersResponse,
};

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: TimerError) -> ApiError {
    let status = match &e {
        TimerError::InvalidDuration(_) | TimerError::NoDurationFound => StatusCode::UNPROCESSABLE_ENTITY,
        TimerError::StateUnavailable(_) => {
            error!("Timer state unavailable: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(ErrorResponse::from(e)))
}

fn views(entries: &[TimerEntry]) -> Vec<TimerView> {
    entries.iter().map(TimerView::from).collect()
}

fn action_response(action: &str, step_key: &str, entry: Option<TimerEntry>) -> Json<TimerResponse> {
    let message = match &entry {
        Some(_) => format!("Timer for {} {}", step_key, action),
        None => format!("No timer for {}, nothing to do", step_key),
    };
    Json(TimerResponse::new(message, entry.as_ref()))
}

/// Handle POST /timers/:step_key/start - Start (or replace) a step timer
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(step_key): Path<String>,
    Json(request): Json<StartTimerRequest>,
) -> Result<Json<TimerResponse>, ApiError> {
    let duration_seconds = match (request.duration_seconds, request.text.as_deref()) {
        (Some(seconds), _) => seconds,
        (None, Some(text)) => match parse_duration(text).map(i64::try_from) {
            Some(Ok(seconds)) => seconds,
            Some(Err(_)) | None => return Err(api_error(TimerError::NoDurationFound)),
        },
        (None, None) => return Err(api_error(TimerError::NoDurationFound)),
    };

    let entry = state
        .start_timer(&step_key, duration_seconds, request.label)
        .map_err(api_error)?;

    info!("Start endpoint called - {}s timer for {}", duration_seconds, step_key);
    Ok(Json(TimerResponse::new(
        format!("Timer started for {}", step_key),
        Some(&entry),
    )))
}

/// Handle POST /timers/:step_key/pause
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(step_key): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let entry = state.pause_timer(&step_key).map_err(api_error)?;
    Ok(action_response("paused", &step_key, entry))
}

/// Handle POST /timers/:step_key/resume
pub async fn resume_handler(
    State(state): State<Arc<AppState>>,
    Path(step_key): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let entry = state.resume_timer(&step_key).map_err(api_error)?;
    Ok(action_response("resumed", &step_key, entry))
}

/// Handle POST /timers/:step_key/reset
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(step_key): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let entry = state.reset_timer(&step_key).map_err(api_error)?;
    Ok(action_response("reset", &step_key, entry))
}

/// Handle DELETE /timers/:step_key - Stop and remove a step timer
pub async fn stop_handler(
    State(state): State<Arc<AppState>>,
    Path(step_key): Path<String>,
) -> Result<Json<TimerResponse>, ApiError> {
    let entry = state.stop_timer(&step_key).map_err(api_error)?;
    Ok(action_response("stopped", &step_key, entry))
}

/// Handle GET /timers/:step_key
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(step_key): Path<String>,
) -> Result<Json<TimerView>, StatusCode> {
    match state.get_timer(&step_key) {
        Ok(Some(entry)) => Ok(Json(TimerView::from(&entry))),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            error!("Failed to get timer {}: {}", step_key, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /timers - Return every timer in the session
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimersResponse>, StatusCode> {
    let timers = match state.list_timers() {
        Ok(timers) => timers,
        Err(e) => {
            error!("Failed to list timers: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(TimersResponse {
        timers: views(&timers),
        background_alerts_degraded: state.background_alerts_degraded(),
        session_started_at: state.session_started_at,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle POST /lifecycle/resume - Host returned to the foreground
pub async fn lifecycle_resume_handler(
    State(state): State<Arc<AppState>>,
    request: Option<Json<ResumeRequest>>,
) -> Result<Json<ResyncResponse>, ApiError> {
    let now_ms = request
        .and_then(|Json(request)| request.now_ms)
        .unwrap_or_else(|| state.now_ms());

    let completed = state.resynchronize(now_ms).map_err(api_error)?;
    let timers = state.list_timers().map_err(api_error)?;

    info!("Lifecycle resume endpoint called - {} timer(s) completed", completed.len());
    Ok(Json(ResyncResponse {
        completed,
        timers: views(&timers),
    }))
}

/// Handle POST /session/end - Tear down the cook-mode session
pub async fn session_end_handler(State(state): State<Arc<AppState>>) -> Result<Json<SessionEndResponse>, ApiError> {
    let removed = state.end_session().map_err(api_error)?;
    Ok(Json(SessionEndResponse {
        removed,
        timestamp: chrono::Utc::now(),
    }))
}

/// Handle POST /durations/parse - Detect a timer duration in step text
pub async fn parse_duration_handler(Json(request): Json<ParseDurationRequest>) -> Json<ParseDurationResponse> {
    let seconds = parse_duration(&request.text);
    Json(ParseDurationResponse {
        text: request.text,
        seconds,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
