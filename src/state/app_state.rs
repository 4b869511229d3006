//! Shared state of the HTTP host

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use super::{ConfigPatch, TimerSnapshot};

/// Intents forwarded from the presentation layer to the timer driver
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Start a run, optionally editing the configuration first
    Start(Option<ConfigPatch>),
    Stop,
    TogglePause,
    /// Edit the duration fields for the next run
    Configure(ConfigPatch),
    /// Tear the timer down and end the driver task
    Shutdown,
}

impl Intent {
    pub fn action_name(&self) -> &'static str {
        match self {
            Intent::Start(_) => "start",
            Intent::Stop => "stop",
            Intent::TogglePause => "pause",
            Intent::Configure(_) => "config",
            Intent::Shutdown => "shutdown",
        }
    }
}

/// An intent plus an optional channel for the snapshot it produced
#[derive(Debug)]
pub struct TimerCommand {
    pub intent: Intent,
    pub reply: Option<oneshot::Sender<TimerSnapshot>>,
}

impl TimerCommand {
    pub fn new(intent: Intent) -> (Self, oneshot::Receiver<TimerSnapshot>) {
        let (reply_tx, reply_rx) = oneshot::channel();
        (
            Self {
                intent,
                reply: Some(reply_tx),
            },
            reply_rx,
        )
    }

    /// Command nobody waits on
    pub fn detached(intent: Intent) -> Self {
        Self {
            intent,
            reply: None,
        }
    }
}

/// Application state handed to every HTTP handler
#[derive(Debug)]
pub struct AppState {
    /// Intent channel into the timer driver
    pub commands: mpsc::Sender<TimerCommand>,
    /// Latest snapshot published by the controller
    pub snapshot_rx: watch::Receiver<TimerSnapshot>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        port: u16,
        host: String,
        commands: mpsc::Sender<TimerCommand>,
        snapshot_rx: watch::Receiver<TimerSnapshot>,
    ) -> Self {
        Self {
            commands,
            snapshot_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Forward an intent and wait for the snapshot it produced
    pub async fn send_intent(&self, intent: Intent) -> Result<TimerSnapshot, String> {
        let action = intent.action_name();
        debug!("Forwarding {} intent to timer", action);

        let (command, reply_rx) = TimerCommand::new(intent);
        self.commands
            .send(command)
            .await
            .map_err(|e| format!("Failed to send {} intent: {}", action, e))?;
        let snapshot = reply_rx
            .await
            .map_err(|e| format!("Timer dropped {} intent: {}", action, e))?;

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        Ok(snapshot)
    }

    pub async fn start(&self, patch: Option<ConfigPatch>) -> Result<TimerSnapshot, String> {
        info!("Start requested");
        self.send_intent(Intent::Start(patch)).await
    }

    pub async fn stop(&self) -> Result<TimerSnapshot, String> {
        info!("Stop requested");
        self.send_intent(Intent::Stop).await
    }

    pub async fn toggle_pause(&self) -> Result<TimerSnapshot, String> {
        info!("Pause toggle requested");
        self.send_intent(Intent::TogglePause).await
    }

    pub async fn configure(&self, patch: ConfigPatch) -> Result<TimerSnapshot, String> {
        info!(
            "Configuration change requested: countdown={:?}ms max_wait={:?}ms",
            patch.countdown_ms, patch.max_wait_ms
        );
        self.send_intent(Intent::Configure(patch)).await
    }

    /// Ask the driver to tear the timer down. Waits for room in the channel
    /// but not for the teardown itself.
    pub async fn shutdown(&self) -> Result<(), String> {
        self.commands
            .send(TimerCommand::detached(Intent::Shutdown))
            .await
            .map_err(|e| format!("Failed to send shutdown intent: {}", e))
    }

    /// Get current timer snapshot
    pub fn get_timer_snapshot(&self) -> TimerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
