//! Configuration and CLI argument handling

use clap::Parser;

use crate::{
    state::TimerConfig,
    timer::DEFAULT_TICK_MS,
    utils::duration_input::parse_seconds_ms,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "surprise-timer")]
#[command(about = "A countdown timer that beeps after a random extra wait")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Countdown length in seconds (decimals allowed)
    #[arg(short, long, default_value = "10")]
    pub countdown: String,

    /// Longest random wait after the countdown, in seconds
    #[arg(short = 'w', long, default_value = "5")]
    pub max_wait: String,

    /// Refresh cadence while counting down, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TICK_MS)]
    pub tick_ms: u64,

    /// Seed for the wait delay generator (random when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Ring the terminal bell on ticks and at the end
    #[arg(long)]
    pub bell: bool,

    /// Command to run for each notification; the cue name is appended
    #[arg(long)]
    pub notify_command: Option<String>,

    /// Also run the notify command on every second tick
    #[arg(long)]
    pub notify_ticks: bool,

    /// Start counting down as soon as the server is up
    #[arg(long)]
    pub autostart: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Initial timer durations from the free-text fields
    pub fn timer_config(&self) -> TimerConfig {
        TimerConfig::new(
            parse_seconds_ms(&self.countdown),
            parse_seconds_ms(&self.max_wait),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["surprise-timer"]).expect("parse");
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.timer_config(), TimerConfig::new(10_000, 5_000));
        assert_eq!(config.tick_ms, DEFAULT_TICK_MS);
        assert_eq!(config.log_level(), "info");
        assert!(config.seed.is_none());
    }

    #[test]
    fn duration_fields_are_sanitised() {
        let config = Config::try_parse_from([
            "surprise-timer",
            "--countdown",
            "2.5s",
            "--max-wait",
            "abc",
            "--seed",
            "9",
            "-v",
        ])
        .expect("parse");
        assert_eq!(config.timer_config(), TimerConfig::new(2_500, 0));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.log_level(), "debug");
    }
}
