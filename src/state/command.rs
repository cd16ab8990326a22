//! Control messages from the UI and the engine's command/event vocabulary

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TimerSnapshot;
use crate::error::TimerError;

/// Raw control message as sent by the UI: `{command, duration?}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
}

impl ControlMessage {
    pub fn new(command: &str) -> Self {
        Self {
            command: Some(command.to_string()),
            duration: None,
        }
    }

    pub fn with_duration(command: &str, duration: f64) -> Self {
        Self {
            command: Some(command.to_string()),
            duration: Some(duration),
        }
    }

    /// Read a control message out of arbitrary JSON.
    ///
    /// Anything that is not an object, or whose fields have the wrong
    /// type, yields a message the parser will ignore.
    pub fn from_value(value: &Value) -> Self {
        Self {
            command: value.get("command").and_then(Value::as_str).map(str::to_string),
            duration: value.get("duration").and_then(Value::as_f64),
        }
    }

    /// Translate into an engine command.
    ///
    /// Unknown or missing commands return `Ok(None)`. Duration commands
    /// with a missing or non-positive duration are rejected.
    pub fn parse(&self) -> Result<Option<EngineCommand>, TimerError> {
        let Some(command) = self.command.as_deref() else {
            return Ok(None);
        };

        let parsed = match command {
            "start" => EngineCommand::Start,
            "pause" => EngineCommand::Pause,
            "resume" => EngineCommand::Resume,
            "stop" => EngineCommand::Stop,
            "get-status" => EngineCommand::GetStatus { request_id: None },
            "set-focus" => EngineCommand::SetFocus(self.duration_seconds(command)?),
            "set-break" => EngineCommand::SetBreak(self.duration_seconds(command)?),
            _ => return Ok(None),
        };
        Ok(Some(parsed))
    }

    fn duration_seconds(&self, command: &str) -> Result<u64, TimerError> {
        let duration = self
            .duration
            .ok_or_else(|| TimerError::MissingDuration(command.to_string()))?;
        if !duration.is_finite() || duration < 1.0 {
            return Err(TimerError::invalid(command, duration));
        }
        Ok(duration.trunc() as u64)
    }
}

/// Commands processed by the engine, in send order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Start,
    Pause,
    Resume,
    Stop,
    SetFocus(u64),
    SetBreak(u64),
    /// `request_id` is echoed back on the matching `Status` event
    GetStatus { request_id: Option<u64> },
}

/// Events emitted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    Tick {
        remaining_seconds: u64,
        is_focus_period: bool,
    },
    PeriodToggled {
        is_focus_period: bool,
        remaining_seconds: u64,
    },
    StatusChanged {
        is_running: bool,
        is_focus_period: bool,
        remaining_seconds: u64,
    },
    Status {
        request_id: Option<u64>,
        snapshot: TimerSnapshot,
    },
}
