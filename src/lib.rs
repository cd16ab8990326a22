//! Focus Timer - a pomodoro countdown engine with a local notification bridge
//!
//! The engine owns the countdown and runs as its own task; the coordinator
//! relays control commands to it and turns its events into notifications
//! for the display that drives it.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use coordinator::TimerCoordinator;
pub use error::TimerError;
pub use state::{AppState, ControlMessage, TimerConfig, TimerSnapshot, UiNotification};
pub use tasks::TimerEngine;
pub use utils::signals::shutdown_signal;
