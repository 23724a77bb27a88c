use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use cook_timers::{
    api::create_router,
    services::NoopScheduler,
    state::AppState,
    utils::{Clock, ManualClock},
};

const T0: i64 = 1_700_000_000_000;

fn app() -> (Router, Arc<AppState>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let state = Arc::new(AppState::new(
        0,
        "127.0.0.1".to_string(),
        Arc::new(NoopScheduler),
        clock.clone(),
    ));
    (create_router(Arc::clone(&state)), state, clock)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn start_pause_resume_stop_flow() {
    let (app, _state, clock) = app();

    let (status, body) = send(&app, "POST", "/timers/step-1/start", Some(json!({"duration_seconds": 60}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry"]["remaining_seconds"], 60);
    assert_eq!(body["entry"]["status"], "running");

    clock.advance_secs(10);
    let (_, body) = send(&app, "POST", "/timers/step-1/pause", None).await;
    assert_eq!(body["entry"]["status"], "paused");
    assert_eq!(body["entry"]["remaining_seconds"], 50);
    assert_eq!(body["entry"]["ends_at"], Value::Null);

    clock.advance_secs(300);
    let (_, body) = send(&app, "POST", "/timers/step-1/resume", None).await;
    assert_eq!(body["entry"]["status"], "running");
    assert_eq!(body["entry"]["remaining_seconds"], 50);

    let (status, _) = send(&app, "DELETE", "/timers/step-1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/timers/step-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn start_detects_duration_from_step_text() {
    let (app, _state, _clock) = app();

    let (status, body) = send(
        &app,
        "POST",
        "/timers/step-5/start",
        Some(json!({"text": "Simmer for 10-15 minutes", "label": "Simmer the sauce"})),
    ).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entry"]["total_seconds"], 600);
    assert_eq!(body["entry"]["label"], "Simmer the sauce");
}

#[tokio::test]
async fn start_rejects_bad_durations() {
    let (app, state, _clock) = app();

    let (status, body) = send(&app, "POST", "/timers/step-1/start", Some(json!({"duration_seconds": -5}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_DURATION");

    let (status, body) = send(&app, "POST", "/timers/step-1/start", Some(json!({"text": "Season to taste"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "NO_DURATION_FOUND");

    assert!(state.list_timers().unwrap().is_empty());
}

#[tokio::test]
async fn start_rejects_oversized_step_text_durations() {
    let (app, state, _clock) = app();

    let (status, body) = send(
        &app,
        "POST",
        "/timers/step-1/start",
        Some(json!({"text": "bake 99999999999999999999 hours"})),
    ).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "NO_DURATION_FOUND");

    // parses fine, but is longer than any timer the registry accepts
    let (status, body) = send(
        &app,
        "POST",
        "/timers/step-1/start",
        Some(json!({"text": "age 1000000 hours"})),
    ).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_DURATION");
    assert!(body["message"].as_str().unwrap().contains("3600000000"));

    assert!(state.list_timers().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_step_actions_are_noops() {
    let (app, state, _clock) = app();

    for (method, uri) in [
        ("POST", "/timers/ghost/pause"),
        ("POST", "/timers/ghost/resume"),
        ("POST", "/timers/ghost/reset"),
        ("DELETE", "/timers/ghost"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::OK, "{} {}", method, uri);
        assert_eq!(body["entry"], Value::Null);
    }

    assert!(state.list_timers().unwrap().is_empty());
}

#[tokio::test]
async fn lifecycle_resume_reports_timers_finished_while_suspended() {
    let (app, _state, _clock) = app();

    send(&app, "POST", "/timers/step-2/start", Some(json!({"duration_seconds": 5}))).await;
    send(&app, "POST", "/timers/step-3/start", Some(json!({"duration_seconds": 90}))).await;

    let (status, body) = send(&app, "POST", "/lifecycle/resume", Some(json!({"now_ms": T0 + 10_000}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["completed"].as_array().unwrap().len(), 1);
    assert_eq!(body["completed"][0]["step_key"], "step-2");
    assert_eq!(body["timers"][0]["status"], "completed");
    assert_eq!(body["timers"][1]["remaining_seconds"], 80);

    let (_, body) = send(&app, "POST", "/lifecycle/resume", Some(json!({"now_ms": T0 + 20_000}))).await;
    assert!(body["completed"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn lifecycle_resume_defaults_to_server_clock() {
    let (app, _state, clock) = app();

    send(&app, "POST", "/timers/step-1/start", Some(json!({"duration_seconds": 60}))).await;
    clock.advance_secs(45);

    let (status, body) = send(&app, "POST", "/lifecycle/resume", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timers"][0]["remaining_seconds"], 15);
}

#[tokio::test]
async fn list_reports_degraded_background_alerts() {
    let (app, _state, _clock) = app();

    let (_, body) = send(&app, "GET", "/timers", None).await;
    assert_eq!(body["background_alerts_degraded"], false);

    send(&app, "POST", "/timers/step-1/start", Some(json!({"duration_seconds": 60}))).await;

    let (status, body) = send(&app, "GET", "/timers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["background_alerts_degraded"], true);
    assert_eq!(body["timers"].as_array().unwrap().len(), 1);
    assert_eq!(body["last_action"], "start step-1");
}

#[tokio::test]
async fn session_end_removes_all_timers() {
    let (app, state, _clock) = app();

    send(&app, "POST", "/timers/step-1/start", Some(json!({"duration_seconds": 60}))).await;
    send(&app, "POST", "/timers/step-2/start", Some(json!({"duration_seconds": 60}))).await;

    let (status, body) = send(&app, "POST", "/session/end", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);
    assert!(state.list_timers().unwrap().is_empty());
}

#[tokio::test]
async fn reset_restarts_completed_timer() {
    let (app, state, clock) = app();

    send(&app, "POST", "/timers/step-1/start", Some(json!({"duration_seconds": 30}))).await;
    let now = clock.advance_secs(40);
    state.tick(now).unwrap();

    let (_, body) = send(&app, "GET", "/timers/step-1", None).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["progress"], 1.0);

    let (_, body) = send(&app, "POST", "/timers/step-1/reset", None).await;
    assert_eq!(body["entry"]["status"], "running");
    assert_eq!(body["entry"]["remaining_seconds"], 30);
    assert_eq!(state.now_ms(), clock.now_ms());
}

#[tokio::test]
async fn parse_and_health_endpoints() {
    let (app, _state, _clock) = app();

    let (status, body) = send(&app, "POST", "/durations/parse", Some(json!({"text": "Bake 1 hour 30 minutes"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["seconds"], 5400);

    let (_, body) = send(&app, "POST", "/durations/parse", Some(json!({"text": "Serve warm"}))).await;
    assert_eq!(body["seconds"], Value::Null);

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
