//! In-memory sink that records cues

use std::sync::Mutex;

use super::{Cue, NotificationSink, NotifyError};

/// Records every cue it receives. Optionally fails each call after recording,
/// which lets embedders exercise the best-effort path.
#[derive(Debug, Default)]
pub struct RecordingSink {
    cues: Mutex<Vec<Cue>>,
    failure: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every call fails with `reason`
    pub fn failing(reason: &str) -> Self {
        Self {
            cues: Mutex::new(Vec::new()),
            failure: Some(reason.to_string()),
        }
    }

    /// All cues received so far, oldest first
    pub fn cues(&self) -> Vec<Cue> {
        self.cues.lock().map(|cues| cues.clone()).unwrap_or_default()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.cues().into_iter().filter(|c| *c == cue).count()
    }

    fn record(&self, cue: Cue) -> Result<(), NotifyError> {
        if let Ok(mut cues) = self.cues.lock() {
            cues.push(cue);
        }
        match &self.failure {
            Some(reason) => Err(NotifyError::Unavailable(reason.clone())),
            None => Ok(()),
        }
    }
}

impl NotificationSink for RecordingSink {
    fn pulse_success(&self) -> Result<(), NotifyError> {
        self.record(Cue::Pulse)
    }

    fn play_tick(&self) -> Result<(), NotifyError> {
        self.record(Cue::Tick)
    }

    fn play_final(&self) -> Result<(), NotifyError> {
        self.record(Cue::Final)
    }
}
