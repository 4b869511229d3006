//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    state::{ConfigPatch, Phase, TimerSnapshot},
    utils::duration_input::{parse_seconds_ms, secs_f64_to_ms},
};

/// A duration field as typed by the user: free text or a plain number of seconds
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DurationField {
    Number(f64),
    Text(String),
}

impl DurationField {
    pub fn to_ms(&self) -> u64 {
        match self {
            DurationField::Number(secs) => secs_f64_to_ms(*secs),
            DurationField::Text(text) => parse_seconds_ms(text),
        }
    }
}

/// Body of `POST /start` and `PUT /config`. Durations are in seconds.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DurationFields {
    pub countdown: Option<DurationField>,
    pub max_wait: Option<DurationField>,
}

impl DurationFields {
    pub fn to_patch(&self) -> ConfigPatch {
        ConfigPatch {
            countdown_ms: self.countdown.as_ref().map(DurationField::to_ms),
            max_wait_ms: self.max_wait.as_ref().map(DurationField::to_ms),
        }
    }
}

/// API response structure for intent endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response; status mirrors the timer phase
    pub fn new(message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: status_name(&timer).to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }
}

/// Status response with everything a view needs to render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    /// Big number in the middle of the dial, or an ellipsis while waiting
    pub display: String,
    /// Remaining time as MM:SS
    pub clock: String,
    /// Status line under the dial
    pub label: String,
    /// Duration fields as they would be typed back in
    pub countdown_field: String,
    pub max_wait_field: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub fn status_name(timer: &TimerSnapshot) -> &'static str {
    match timer.phase {
        Phase::Idle => "idle",
        Phase::Counting if timer.paused => "paused",
        Phase::Counting => "counting",
        Phase::Waiting => "waiting",
    }
}

pub fn display_text(timer: &TimerSnapshot) -> String {
    match timer.phase {
        Phase::Waiting => "…".to_string(),
        _ => timer.seconds_left.to_string(),
    }
}
