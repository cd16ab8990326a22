//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

use crate::{error::TimerError, state::TimerConfig};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "focus-timer")]
#[command(about = "A pomodoro focus timer with a local notification bridge")]
#[command(version)]
pub struct Config {
    /// Port to bind the bridge to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Default focus period in minutes
    #[arg(short, long = "focus", default_value = "25")]
    pub focus_minutes: u64,

    /// Default break period in minutes
    #[arg(short, long = "break-minutes", default_value = "5")]
    pub break_minutes: u64,

    /// How long a status query waits for the engine, in milliseconds
    #[arg(long, default_value = "2000")]
    pub status_timeout_ms: u64,

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

    /// Default durations for newly created engines
    pub fn timer_config(&self) -> Result<TimerConfig, TimerError> {
        let focus = minutes_to_seconds("focus duration", self.focus_minutes)?;
        let rest = minutes_to_seconds("break duration", self.break_minutes)?;
        TimerConfig::new(focus, rest)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_millis(self.status_timeout_ms)
    }
}

fn minutes_to_seconds(what: &str, minutes: u64) -> Result<u64, TimerError> {
    minutes
        .checked_mul(60)
        .ok_or_else(|| TimerError::invalid(what, format!("{} minutes", minutes)))
}
