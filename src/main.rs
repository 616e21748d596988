// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::live_poller::LivePoller;
use crate::application::power_service::PowerService;
use crate::application::sample_store::SampleStore;
use crate::application::voltage_repository::VoltageRepository;
use crate::infrastructure::config::load_config;
use crate::infrastructure::json_repository::JsonVoltageRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_change, get_duration, get_missing, get_span, get_state, get_summary, get_switches,
    get_window, health_check, post_sample, start_polling, stop_polling, stream_window,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("power_monitor=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = load_config()?;

    // Seed the session from the recording (infrastructure layer)
    let repository = JsonVoltageRepository::new(config.seed.path.clone());
    let voltages = repository.load_voltages().await?;
    let store = SampleStore::from_recording(
        voltages,
        chrono::Utc::now().timestamp_millis(),
        config.seed.rotation_offset,
        config.seed.sample_interval_ms,
    )
    .context("Refusing to start without a usable voltage recording")?;

    // Create services (application layer)
    let power_service = PowerService::new(store, &config.monitor);
    let poll_interval = Duration::from_millis(config.monitor.poll_interval_ms);
    let poller = LivePoller::new(power_service.clone());
    poller.start(poll_interval);

    let state = Arc::new(AppState {
        power_service,
        poller,
        poll_interval,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/power/window", get(get_window))
        .route("/power/state", get(get_state))
        .route("/power/summary", get(get_summary))
        .route("/power/changes/:direction", get(get_change))
        .route("/power/missing", get(get_missing))
        .route("/power/switches", get(get_switches))
        .route("/power/span", get(get_span))
        .route("/power/duration", get(get_duration))
        .route("/power/samples", post(post_sample))
        .route("/power/polling/start", post(start_polling))
        .route("/power/polling/stop", post(stop_polling))
        .route("/power/stream", get(stream_window))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind_addr))?;
    tracing::info!("Starting power-monitor service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.poller.cancel().await;
    tracing::info!("Power monitor stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
