//! Timer core
//!
//! The controller is the only place timing decisions are made. Hosts feed it
//! intents and scheduler wakeups and render the snapshots it publishes.

pub mod controller;

pub use controller::{draw_wait_delay, progress_fraction, TimerController, DEFAULT_TICK_MS};
