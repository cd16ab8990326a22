//! State management module
//! 
//! This module contains the timer data model, the command and notification
//! vocabularies, and the shared application state.

pub mod app_state;
pub mod command;
pub mod notification;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use command::{ControlMessage, EngineCommand, EngineEvent};
pub use notification::{BadgeStatus, BroadcastSink, ChannelSink, NotificationSink, UiNotification};
pub use timer_state::{Period, TimerConfig, TimerSnapshot, TimerState};
