//! Timer configuration, countdown state and snapshots

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Default focus period length (25 minutes)
pub const DEFAULT_FOCUS_SECONDS: u64 = 25 * 60;
/// Default break period length (5 minutes)
pub const DEFAULT_BREAK_SECONDS: u64 = 5 * 60;

/// The two alternating phases of a pomodoro cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Focus,
    Break,
}

impl Period {
    pub fn from_focus_flag(is_focus_period: bool) -> Self {
        if is_focus_period { Period::Focus } else { Period::Break }
    }

    pub fn toggled(self) -> Self {
        match self {
            Period::Focus => Period::Break,
            Period::Break => Period::Focus,
        }
    }

    pub fn is_focus(self) -> bool {
        self == Period::Focus
    }
}

/// Configured period durations, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    #[serde(default = "default_focus")]
    pub focus_duration_seconds: u64,
    #[serde(default = "default_break")]
    pub break_duration_seconds: u64,
}

fn default_focus() -> u64 {
    DEFAULT_FOCUS_SECONDS
}

fn default_break() -> u64 {
    DEFAULT_BREAK_SECONDS
}

impl TimerConfig {
    /// Build a config, rejecting zero-length periods
    pub fn new(focus_duration_seconds: u64, break_duration_seconds: u64) -> Result<Self, TimerError> {
        let config = Self {
            focus_duration_seconds,
            break_duration_seconds,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TimerError> {
        if self.focus_duration_seconds == 0 {
            return Err(TimerError::invalid("focus duration", 0));
        }
        if self.break_duration_seconds == 0 {
            return Err(TimerError::invalid("break duration", 0));
        }
        Ok(())
    }

    pub fn duration_of(&self, period: Period) -> u64 {
        match period {
            Period::Focus => self.focus_duration_seconds,
            Period::Break => self.break_duration_seconds,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_duration_seconds: DEFAULT_FOCUS_SECONDS,
            break_duration_seconds: DEFAULT_BREAK_SECONDS,
        }
    }
}

/// Countdown state, owned exclusively by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub remaining_seconds: u64,
    pub is_focus_period: bool,
    pub is_running: bool,
}

impl TimerState {
    /// Idle at the start of a fresh focus period
    pub fn initial(config: &TimerConfig) -> Self {
        Self {
            remaining_seconds: config.focus_duration_seconds,
            is_focus_period: true,
            is_running: false,
        }
    }

    pub fn period(&self) -> Period {
        Period::from_focus_flag(self.is_focus_period)
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            is_running: self.is_running,
            remaining_seconds: self.remaining_seconds,
            is_focus_period: self.is_focus_period,
        }
    }
}

/// Point-in-time read of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub is_running: bool,
    pub remaining_seconds: u64,
    pub is_focus_period: bool,
}
