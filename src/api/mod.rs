//! HTTP API module
//!
//! This module contains the bridge endpoints that let a display drive the
//! timer and receive its notifications.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/create", post(create_handler))
        .route("/timer/control", post(control_handler))
        .route("/timer/status", get(status_handler))
        .route("/timer/terminate", post(terminate_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::state::TimerConfig;

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            TimerConfig::new(120, 30).unwrap(),
            Duration::from_secs(1),
        ));
        (create_router(Arc::clone(&state)), state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn status_is_null_before_create() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/timer/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], Value::Null);
    }

    #[tokio::test]
    async fn create_uses_defaults_for_missing_fields() {
        let (app, state) = app();
        let response = app
            .clone()
            .oneshot(post_json("/timer/create", json!({"breakDurationSeconds": 10})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.coordinator.is_active());

        let response = app
            .oneshot(Request::get("/timer/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["status"]["remainingSeconds"], 120);
        assert_eq!(json["status"]["isFocusPeriod"], true);
        assert_eq!(json["last_action"], "timer-create");
    }

    #[tokio::test]
    async fn invalid_duration_is_a_bad_request() {
        let (app, _) = app();
        app.clone()
            .oneshot(post_json("/timer/create", json!({})))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json("/timer/control", json!({"command": "set-focus", "duration": 0})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["status"], "error");
    }

    #[tokio::test]
    async fn unknown_and_malformed_commands_are_accepted_silently() {
        let (app, _) = app();
        let response = app
            .clone()
            .oneshot(post_json("/timer/control", json!({"command": "warp"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::post("/timer/control").body(Body::from("not json")).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn terminate_clears_timer() {
        let (app, state) = app();
        app.clone()
            .oneshot(post_json("/timer/create", json!({})))
            .await
            .unwrap();
        let response = app
            .oneshot(Request::post("/timer/terminate").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!state.coordinator.is_active());
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["status"], "ok");
    }
}
