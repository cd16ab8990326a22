//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};

use super::{BroadcastSink, TimerConfig};
use crate::coordinator::TimerCoordinator;

/// Capacity of the notification fan-out channel
const NOTIFICATION_CAPACITY: usize = 100;

/// Shared state behind the HTTP bridge
pub struct AppState {
    /// The timer coordinator (owns the engine)
    pub coordinator: TimerCoordinator,
    /// Durations used when a create request leaves them out
    pub default_config: TimerConfig,
    /// Notification fan-out to connected displays
    pub notifications: BroadcastSink,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    last_action: Mutex<Option<(String, DateTime<Utc>)>>,
}

impl AppState {
    /// Create a new AppState with its own coordinator
    pub fn new(port: u16, host: String, default_config: TimerConfig, status_timeout: Duration) -> Self {
        let notifications = BroadcastSink::new(NOTIFICATION_CAPACITY);
        let coordinator = TimerCoordinator::with_status_timeout(Arc::new(notifications.clone()), status_timeout);

        Self {
            coordinator,
            default_config,
            notifications,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
        }
    }

    /// Record the most recent bridge action
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some((action.to_string(), Utc::now()));
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.last_action.lock().ok().and_then(|a| a.clone()) {
            Some((action, time)) => (Some(action), Some(time)),
            None => (None, None),
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed())
    }
}

fn format_uptime(duration: Duration) -> String {
    let hours = duration.as_secs() / 3600;
    let minutes = (duration.as_secs() % 3600) / 60;
    let seconds = duration.as_secs() % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(42)), "42s");
        assert_eq!(format_uptime(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_uptime(Duration::from_secs(3725)), "1h 2m 5s");
    }

    #[test]
    fn last_action_is_recorded() {
        let state = AppState::new(0, "127.0.0.1".to_string(), TimerConfig::default(), Duration::from_secs(1));
        assert_eq!(state.get_last_action(), (None, None));

        state.record_action("timer-terminate");
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("timer-terminate"));
        assert!(time.is_some());
    }
}
