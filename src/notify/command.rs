//! External command sink

use tokio::{process::Command, runtime::Handle};
use tracing::{debug, info, warn};

use super::{Cue, NotificationSink, NotifyError};

/// Runs an external program for each cue, e.g. `paplay` or a haptics helper.
///
/// The cue name (`pulse`, `tick`, `final`) is appended as the last argument
/// and also exported as `SURPRISE_TIMER_CUE`. The command runs detached on
/// the current tokio runtime; its outcome is only logged.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
    include_ticks: bool,
}

impl CommandSink {
    /// Build from a whitespace-separated command line
    pub fn from_command_line(command_line: &str) -> Result<Self, NotifyError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(NotifyError::EmptyCommand)?;
        Ok(Self {
            program,
            args: parts.collect(),
            include_ticks: false,
        })
    }

    /// Also run the command on per-second ticks
    pub fn with_ticks(mut self, include_ticks: bool) -> Self {
        self.include_ticks = include_ticks;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn spawn(&self, cue: Cue) -> Result<(), NotifyError> {
        let handle = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(cue.to_string())
            .env("SURPRISE_TIMER_CUE", cue.to_string())
            .kill_on_drop(false);
        let program = self.program.clone();

        debug!("Running notification command {} for {} cue", program, cue);
        handle.spawn(async move {
            match command.output().await {
                Ok(output) if output.status.success() => {
                    info!("Notification command {} finished for {} cue", program, cue);
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(
                        "Notification command {} failed for {} cue (exit code: {}): {}",
                        program,
                        cue,
                        output.status.code().unwrap_or(-1),
                        stderr.trim()
                    );
                }
                Err(e) => {
                    warn!("Failed to execute notification command {}: {}", program, e);
                }
            }
        });
        Ok(())
    }
}

impl NotificationSink for CommandSink {
    fn pulse_success(&self) -> Result<(), NotifyError> {
        self.spawn(Cue::Pulse)
    }

    fn play_tick(&self) -> Result<(), NotifyError> {
        if self.include_ticks {
            self.spawn(Cue::Tick)
        } else {
            Ok(())
        }
    }

    fn play_final(&self) -> Result<(), NotifyError> {
        self.spawn(Cue::Final)
    }
}
