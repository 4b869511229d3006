//! Utility functions module
//!
//! Duration field parsing and signal handling.

pub mod duration_input;
pub mod signals;

// Re-export main functions
pub use duration_input::{format_mm_ss, parse_seconds_ms, sanitize, seconds_left};
pub use signals::shutdown_signal;
