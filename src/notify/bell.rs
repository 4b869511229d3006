//! Terminal bell sink

use std::io::Write;

use super::{NotificationSink, NotifyError};

const BEL: &[u8] = b"\x07";

/// Rings the terminal bell: once per tick, twice for the final cue.
/// The pulse has no terminal equivalent and is a no-op.
#[derive(Debug, Default, Clone)]
pub struct BellSink;

impl BellSink {
    pub fn new() -> Self {
        Self
    }

    fn ring(&self, times: usize) -> Result<(), NotifyError> {
        let mut stderr = std::io::stderr().lock();
        for _ in 0..times {
            stderr.write_all(BEL)?;
        }
        stderr.flush()?;
        Ok(())
    }
}

impl NotificationSink for BellSink {
    fn pulse_success(&self) -> Result<(), NotifyError> {
        Ok(())
    }

    fn play_tick(&self) -> Result<(), NotifyError> {
        self.ring(1)
    }

    fn play_final(&self) -> Result<(), NotifyError> {
        self.ring(2)
    }
}
