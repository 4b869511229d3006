//! Notification sinks
//!
//! A sink turns timer cues into something a person notices. Every call is
//! best-effort: the controller logs a failure and moves on.

pub mod bell;
pub mod command;
pub mod memory;

pub use bell::BellSink;
pub use command::CommandSink;
pub use memory::RecordingSink;

use std::{fmt, sync::Arc};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Errors a sink may report. None of them are fatal to the timer.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Failed to write to terminal: {0}")]
    Io(#[from] std::io::Error),

    #[error("No async runtime available to run notification command")]
    NoRuntime,

    #[error("Notification command is empty")]
    EmptyCommand,

    #[error("Notification unavailable: {0}")]
    Unavailable(String),
}

/// The three cues the controller emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    /// Short pulse at the end of the random wait
    Pulse,
    /// Once per second boundary while counting down
    Tick,
    /// Longer sound at the end of the random wait
    Final,
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cue::Pulse => write!(f, "pulse"),
            Cue::Tick => write!(f, "tick"),
            Cue::Final => write!(f, "final"),
        }
    }
}

/// Receiver for timer cues. Implementations must return quickly.
pub trait NotificationSink: Send + Sync {
    fn pulse_success(&self) -> Result<(), NotifyError>;

    fn play_tick(&self) -> Result<(), NotifyError>;

    fn play_final(&self) -> Result<(), NotifyError>;

    fn emit(&self, cue: Cue) -> Result<(), NotifyError> {
        match cue {
            Cue::Pulse => self.pulse_success(),
            Cue::Tick => self.play_tick(),
            Cue::Final => self.play_final(),
        }
    }
}

/// Sink that only logs
#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn pulse_success(&self) -> Result<(), NotifyError> {
        info!("Pulse");
        Ok(())
    }

    fn play_tick(&self) -> Result<(), NotifyError> {
        tracing::debug!("Tick");
        Ok(())
    }

    fn play_final(&self) -> Result<(), NotifyError> {
        info!("Final cue");
        Ok(())
    }
}

/// Forwards every cue to each inner sink in order
#[derive(Default, Clone)]
pub struct FanOutSink {
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl FanOutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Every sink gets the cue even if an earlier one failed; the first
    /// error is reported.
    fn fan_out(&self, cue: Cue) -> Result<(), NotifyError> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.emit(cue) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl NotificationSink for FanOutSink {
    fn pulse_success(&self) -> Result<(), NotifyError> {
        self.fan_out(Cue::Pulse)
    }

    fn play_tick(&self) -> Result<(), NotifyError> {
        self.fan_out(Cue::Tick)
    }

    fn play_final(&self) -> Result<(), NotifyError> {
        self.fan_out(Cue::Final)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_out_reaches_every_sink_and_reports_first_error() {
        let failing = Arc::new(RecordingSink::failing("speaker unplugged"));
        let healthy = Arc::new(RecordingSink::new());
        let sink = FanOutSink::new()
            .with(failing.clone())
            .with(healthy.clone());

        let err = sink.play_final().expect_err("should fail");
        assert!(err.to_string().contains("speaker unplugged"));
        assert_eq!(failing.count(Cue::Final), 1);
        assert_eq!(healthy.count(Cue::Final), 1);
    }

    #[test]
    fn empty_fan_out_succeeds() {
        let sink = FanOutSink::new();
        assert!(sink.is_empty());
        assert!(sink.play_tick().is_ok());
    }
}
