//! Timer configuration, phase and the snapshot published to observers

use serde::{Deserialize, Serialize};

use crate::utils::duration_input::seconds_left;

/// Coarse state of the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Counting,
    Waiting,
}

impl Phase {
    /// Human-readable status line shown under the countdown
    pub fn label(&self, paused: bool) -> &'static str {
        match self {
            Phase::Idle => "Ready",
            Phase::Counting if paused => "Paused",
            Phase::Counting => "Counting",
            Phase::Waiting => "Waiting…",
        }
    }
}

/// Durations for one run, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub countdown_ms: u64,
    pub max_wait_ms: u64,
}

impl TimerConfig {
    pub fn new(countdown_ms: u64, max_wait_ms: u64) -> Self {
        Self {
            countdown_ms,
            max_wait_ms,
        }
    }

    pub fn from_secs(countdown_secs: u64, max_wait_secs: u64) -> Self {
        Self::new(countdown_secs * 1000, max_wait_secs * 1000)
    }
}

/// Partial edit of the duration fields; missing fields keep their value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    pub countdown_ms: Option<u64>,
    pub max_wait_ms: Option<u64>,
}

impl ConfigPatch {
    pub fn apply(&self, base: TimerConfig) -> TimerConfig {
        TimerConfig {
            countdown_ms: self.countdown_ms.unwrap_or(base.countdown_ms),
            max_wait_ms: self.max_wait_ms.unwrap_or(base.max_wait_ms),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.countdown_ms.is_none() && self.max_wait_ms.is_none()
    }
}

impl From<TimerConfig> for ConfigPatch {
    fn from(config: TimerConfig) -> Self {
        Self {
            countdown_ms: Some(config.countdown_ms),
            max_wait_ms: Some(config.max_wait_ms),
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::from_secs(10, 5)
    }
}

/// Immutable view of the timer, emitted on every tick and transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub paused: bool,
    pub remaining_ms: u64,
    /// Countdown the progress is measured against: the frozen run value
    /// while a run is active, the configured value while idle
    pub countdown_ms: u64,
    pub max_wait_ms: u64,
    pub progress: f64,
    pub seconds_left: u64,
}

impl TimerSnapshot {
    /// Snapshot of an idle timer with the given configuration
    pub fn idle(config: TimerConfig) -> Self {
        Self {
            phase: Phase::Idle,
            paused: false,
            remaining_ms: config.countdown_ms,
            countdown_ms: config.countdown_ms,
            max_wait_ms: config.max_wait_ms,
            progress: 0.0,
            seconds_left: seconds_left(config.countdown_ms),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Counting && !self.paused
    }

    pub fn label(&self) -> &'static str {
        self.phase.label(self.paused)
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::idle(TimerConfig::default())
    }
}
