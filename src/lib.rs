//! Surprise Timer - a countdown that beeps after a random extra wait
//!
//! The core is [`timer::TimerController`], a state machine driven by a
//! [`scheduler::Scheduler`]. The rest of the crate hosts one controller
//! behind a small HTTP API and turns its cues into sounds.

pub mod config;
pub mod state;
pub mod api;
pub mod notify;
pub mod scheduler;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Phase, TimerConfig, TimerSnapshot};
pub use api::create_router;
pub use notify::{NotificationSink, NotifyError};
pub use scheduler::{ManualScheduler, RuntimeScheduler, Scheduler};
pub use timer::TimerController;
pub use utils::signals::shutdown_signal;
