//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{error, info, warn};

use crate::{
    state::AppState,
    utils::duration_input::{format_mm_ss, format_seconds_field},
};
use super::responses::{
    display_text, ApiResponse, DurationFields, HealthResponse, StatusResponse,
};

/// Handle POST /start - Start a run, optionally editing the durations first
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DurationFields>, JsonRejection>,
) -> Result<Json<ApiResponse>, StatusCode> {
    // No JSON body at all means "start with what is configured"
    let patch = match body {
        Ok(Json(fields)) => Some(fields.to_patch()).filter(|p| !p.is_empty()),
        Err(JsonRejection::MissingJsonContentType(_)) => None,
        Err(rejection) => {
            warn!("Rejected start body: {}", rejection);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    match state.start(patch).await {
        Ok(timer) => {
            info!("Start endpoint called - countdown of {}ms running", timer.countdown_ms);
            Ok(Json(ApiResponse::new("Countdown started".to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to start timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /stop - Cancel whatever is running
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.stop().await {
        Ok(timer) => {
            info!("Stop endpoint called - timer idle");
            Ok(Json(ApiResponse::new("Timer stopped".to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to stop timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /pause - Pause or resume the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.toggle_pause().await {
        Ok(timer) => {
            let message = if timer.paused {
                "Countdown paused"
            } else if timer.is_running() {
                "Countdown resumed"
            } else {
                "Nothing to pause"
            };
            info!("Pause endpoint called - {}", message);
            Ok(Json(ApiResponse::new(message.to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to toggle pause: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /config - Edit the duration fields for the next run
pub async fn config_handler(
    State(state): State<Arc<AppState>>,
    Json(fields): Json<DurationFields>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.configure(fields.to_patch()).await {
        Ok(timer) => {
            let message = if timer.is_idle() {
                "Configuration updated"
            } else {
                "Configuration saved for the next run"
            };
            Ok(Json(ApiResponse::new(message.to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to update configuration: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /status - Return the current snapshot with display text
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timer = state.get_timer_snapshot();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        display: display_text(&timer),
        clock: format_mm_ss(timer.remaining_ms),
        label: timer.label().to_string(),
        countdown_field: format_seconds_field(timer.countdown_ms),
        max_wait_field: format_seconds_field(timer.max_wait_ms),
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream every snapshot as a server-sent event
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshots = stream::unfold((state.subscribe(), true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let timer = rx.borrow_and_update().clone();
        let event = match serde_json::to_string(&timer) {
            Ok(json) => Event::default().event("snapshot").data(json),
            Err(e) => {
                warn!("Failed to serialize snapshot: {}", e);
                Event::default().event("error").data(e.to_string())
            }
        };
        Some((Ok::<_, Infallible>(event), (rx, false)))
    });

    Sse::new(snapshots).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
