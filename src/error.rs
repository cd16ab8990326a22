//! Error types surfaced to callers of the timer core

use thiserror::Error;

/// Errors returned by the coordinator and the command parser
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimerError {
    /// A duration was supplied but is not a positive number of seconds
    #[error("invalid duration for {command}: {value} (must be at least 1 second)")]
    InvalidDuration { command: String, value: String },

    /// A command that requires a duration arrived without one
    #[error("{0} requires a duration")]
    MissingDuration(String),

    /// Internal shared state could not be locked
    #[error("failed to lock {0}")]
    LockPoisoned(&'static str),
}

impl TimerError {
    pub(crate) fn invalid(command: &str, value: impl ToString) -> Self {
        Self::InvalidDuration {
            command: command.to_string(),
            value: value.to_string(),
        }
    }
}
