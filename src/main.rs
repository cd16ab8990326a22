//! Focus Timer - a pomodoro countdown engine with a local notification bridge
//!
//! This is the main entry point for the focus-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focus_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, focus={}min, break={}min",
        config.host, config.port, config.focus_minutes, config.break_minutes
    );

    let timer_config = config.timer_config()?;

    // Create application state; the engine itself is created on demand
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        timer_config,
        config.status_timeout(),
    ));

    let app = create_router(Arc::clone(&state));

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/create    - Create the timer engine");
    info!("  POST /timer/control   - Send start/pause/resume/stop/set-focus/set-break/get-status");
    info!("  GET  /timer/status    - Query the current countdown");
    info!("  POST /timer/terminate - Destroy the timer engine");
    info!("  GET  /events          - Notification stream (SSE)");
    info!("  GET  /health          - Health check");

    let server = axum::serve(listener, app);
    let shutdown = async {
        match shutdown_signal().await {
            Ok(_) => info!("Shutdown signal received"),
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown => {}
    }

    // The display goes away with the server
    state.coordinator.close_window();

    info!("Server shutdown complete");
    Ok(())
}
