//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::TimerSnapshot;

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer_active: bool,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer_active: bool) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer_active,
        }
    }

    /// Create an ok response
    pub fn ok(message: String, timer_active: bool) -> Self {
        Self::new("ok", message, timer_active)
    }

    /// Create an error response
    pub fn error(message: String, timer_active: bool) -> Self {
        Self::new("error", message, timer_active)
    }
}

/// Reply to a status query; `status` is null when no timer exists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: Option<TimerSnapshot>,
    pub timestamp: DateTime<Utc>,
    pub uptime: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub host: String,
    pub port: u16,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok(host: String, port: u16) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            host,
            port,
        }
    }
}
