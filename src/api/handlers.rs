//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc, time::Duration};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::state::{AppState, ControlMessage, TimerConfig};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

type ApiResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

/// Handle POST /timer/create - Create the engine if none exists
pub async fn create_handler(State(state): State<Arc<AppState>>, body: Option<Json<Value>>) -> ApiResult {
    state.record_action("timer-create");

    let config = match body {
        Some(Json(value)) if !value.is_null() => match serde_json::from_value::<PartialConfig>(value) {
            Ok(partial) => partial.merge(state.default_config),
            Err(e) => {
                warn!("Malformed timer config: {}", e);
                return Err(bad_request(format!("Malformed timer config: {}", e), &state));
            }
        },
        _ => state.default_config,
    };

    match state.coordinator.create_engine(config) {
        Ok(true) => {
            info!("Create endpoint called - timer engine created");
            Ok(Json(ApiResponse::ok("Timer created".to_string(), true)))
        }
        Ok(false) => Ok(Json(ApiResponse::ok("Timer already exists".to_string(), true))),
        Err(e) => {
            error!("Failed to create timer engine: {}", e);
            Err(bad_request(e.to_string(), &state))
        }
    }
}

/// Handle POST /timer/control - Forward a control command to the engine
pub async fn control_handler(State(state): State<Arc<AppState>>, body: Option<Json<Value>>) -> ApiResult {
    state.record_action("timer-control");

    let message = match body {
        Some(Json(value)) => ControlMessage::from_value(&value),
        None => {
            debug!("Control request without a JSON body, ignoring");
            ControlMessage::default()
        }
    };

    match state.coordinator.dispatch(&message) {
        Ok(()) => Ok(Json(ApiResponse::ok(
            "Command accepted".to_string(),
            state.coordinator.is_active(),
        ))),
        Err(e) => {
            warn!("Rejected timer command: {}", e);
            Err(bad_request(e.to_string(), &state))
        }
    }
}

/// Handle GET /timer/status - Query the engine for a snapshot
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let status = state.coordinator.query_status().await;
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        status,
        timestamp: chrono::Utc::now(),
        uptime: state.get_uptime(),
        last_action,
        last_action_time,
    })
}

/// Handle POST /timer/terminate - Destroy the engine
pub async fn terminate_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    state.record_action("timer-terminate");
    state.coordinator.terminate();
    Json(ApiResponse::ok("Timer terminated".to_string(), false))
}

/// Handle GET /events - Stream notifications to a display
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Display connected to notification stream");
    let rx = state.notifications.subscribe();

    let stream = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    let event = match Event::default().event(notification.channel()).json_data(&notification) {
                        Ok(event) => event,
                        Err(e) => {
                            error!("Failed to encode notification: {}", e);
                            continue;
                        }
                    };
                    return Some((Ok::<_, Infallible>(event), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Display lagging, skipped {} notifications", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse::ok(state.host.clone(), state.port))
}

fn bad_request(message: String, state: &AppState) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(message, state.coordinator.is_active())),
    )
}

/// Create request body; omitted durations come from the CLI defaults
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartialConfig {
    focus_duration_seconds: Option<u64>,
    break_duration_seconds: Option<u64>,
}

impl PartialConfig {
    fn merge(self, defaults: TimerConfig) -> TimerConfig {
        TimerConfig {
            focus_duration_seconds: self.focus_duration_seconds.unwrap_or(defaults.focus_duration_seconds),
            break_duration_seconds: self.break_duration_seconds.unwrap_or(defaults.break_duration_seconds),
        }
    }
}
