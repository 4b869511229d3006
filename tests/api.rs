use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::Value;
use surprise_timer::{
    api::create_router,
    notify::RecordingSink,
    scheduler::RuntimeScheduler,
    state::{AppState, TimerConfig},
    tasks::spawn_timer_driver,
    timer::TimerController,
};
use tower::ServiceExt;

fn setup(config: TimerConfig) -> (Router, Arc<AppState>) {
    let sink = Arc::new(RecordingSink::new());
    let controller = TimerController::with_seed(config, RuntimeScheduler::new(), sink, Some(5));
    let (commands, snapshots, _driver) = spawn_timer_driver(controller);
    let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), commands, snapshots));
    (create_router(Arc::clone(&state)), state)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _) = setup(TimerConfig::default());
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn status_starts_idle_with_full_countdown() {
    let (app, _) = setup(TimerConfig::new(10_000, 5_000));
    let (status, body) = call(&app, "GET", "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "idle");
    assert_eq!(body["timer"]["remaining_ms"], 10_000);
    assert_eq!(body["display"], "10");
    assert_eq!(body["clock"], "00:10");
    assert_eq!(body["label"], "Ready");
    assert_eq!(body["countdown_field"], "10");
    assert_eq!(body["max_wait_field"], "5");
}

#[tokio::test]
async fn start_without_body_uses_configured_durations() {
    let (app, state) = setup(TimerConfig::new(60_000, 0));
    let (status, body) = call(&app, "POST", "/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "counting");
    assert_eq!(body["timer"]["countdown_ms"], 60_000);

    let (last_action, last_time) = state.get_last_action();
    assert_eq!(last_action.as_deref(), Some("start"));
    assert!(last_time.is_some());
}

#[tokio::test]
async fn start_with_free_text_fields() {
    let (app, _) = setup(TimerConfig::new(10_000, 5_000));
    let (status, body) = call(
        &app,
        "POST",
        "/start",
        Some(r#"{"countdown": "3o0", "max_wait": ""}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["countdown_ms"], 30_000);
    assert_eq!(body["timer"]["max_wait_ms"], 0);
}

#[tokio::test]
async fn pause_resume_and_stop() {
    let (app, _) = setup(TimerConfig::new(60_000, 0));
    call(&app, "POST", "/start", None).await;

    let (_, body) = call(&app, "POST", "/pause", None).await;
    assert_eq!(body["status"], "paused");
    assert_eq!(body["message"], "Countdown paused");

    let (_, body) = call(&app, "POST", "/pause", None).await;
    assert_eq!(body["status"], "counting");

    let (_, body) = call(&app, "POST", "/stop", None).await;
    assert_eq!(body["status"], "idle");
    assert_eq!(body["timer"]["remaining_ms"], 60_000);
}

#[tokio::test]
async fn pause_while_idle_is_ignored() {
    let (app, _) = setup(TimerConfig::default());
    let (status, body) = call(&app, "POST", "/pause", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "idle");
    assert_eq!(body["message"], "Nothing to pause");
}

#[tokio::test]
async fn config_applies_now_when_idle_and_later_when_running() {
    let (app, _) = setup(TimerConfig::new(10_000, 5_000));

    let (_, body) = call(&app, "PUT", "/config", Some(r#"{"countdown": 2.5}"#)).await;
    assert_eq!(body["timer"]["remaining_ms"], 2_500);
    assert_eq!(body["timer"]["max_wait_ms"], 5_000);

    call(&app, "POST", "/start", Some(r#"{"countdown": "60"}"#)).await;
    let (_, body) = call(&app, "PUT", "/config", Some(r#"{"countdown": "5"}"#)).await;
    assert_eq!(body["message"], "Configuration saved for the next run");
    assert_eq!(body["timer"]["countdown_ms"], 60_000);

    let (_, body) = call(&app, "POST", "/stop", None).await;
    assert_eq!(body["timer"]["remaining_ms"], 5_000);
}

#[tokio::test]
async fn config_rejects_non_json() {
    let (app, _) = setup(TimerConfig::default());
    let (status, _) = call(&app, "PUT", "/config", None).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn start_rejects_malformed_json() {
    let (app, state) = setup(TimerConfig::new(10_000, 5_000));
    let (status, _) = call(&app, "POST", "/start", Some(r#"{"countdown": 3,}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(state.get_timer_snapshot().is_idle());
    assert_eq!(state.get_last_action().0, None);
}

#[tokio::test]
async fn start_rejects_wrongly_typed_fields() {
    let (app, state) = setup(TimerConfig::new(10_000, 5_000));
    let (status, _) = call(&app, "POST", "/start", Some(r#"{"countdown": [1]}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(state.get_timer_snapshot().is_idle());
}

async fn next_frame(body: &mut axum::body::BodyDataStream) -> String {
    let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
        .await
        .expect("frame in time")
        .expect("stream open")
        .expect("chunk");
    String::from_utf8(chunk.to_vec()).expect("utf-8")
}

#[tokio::test]
async fn events_stream_current_and_later_snapshots() {
    let (app, _) = setup(TimerConfig::new(60_000, 0));

    let request = Request::builder()
        .uri("/events")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let mut body = response.into_body().into_data_stream();
    let first = next_frame(&mut body).await;
    assert!(first.contains("event: snapshot"));
    assert!(first.contains(r#""phase":"idle""#));

    let (status, _) = call(&app, "POST", "/start", None).await;
    assert_eq!(status, StatusCode::OK);

    let second = next_frame(&mut body).await;
    assert!(second.contains("event: snapshot"));
    assert!(second.contains(r#""phase":"counting""#));
}
