//! State management module
//!
//! Timer-facing types plus the shared state of the HTTP host.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppState, Intent, TimerCommand};
pub use timer_state::{ConfigPatch, Phase, TimerConfig, TimerSnapshot};
