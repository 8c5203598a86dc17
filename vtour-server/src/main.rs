//! vtour-server - Tour Processing Service
//!
//! Accepts property photo uploads per tour, runs the staged processing
//! pipeline in the background, and serves the polling API the viewer client
//! consumes. All state is in-memory for the process lifetime.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vtour_common::config::ServiceConfig;
use vtour_common::events::EventBus;

use vtour_server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting vtour-server (Tour Processing)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve configuration and make sure the uploads folder exists
    let config = ServiceConfig::resolve()?;
    config.ensure_uploads_dir()?;
    info!("Uploads directory: {}", config.uploads_dir.display());

    // Create event bus for SSE broadcasting
    let event_bus = EventBus::new(100);
    info!("Event bus initialized");

    // Create application state
    let state = AppState::new(config.uploads_dir.clone(), event_bus);
    let supervisor = state.supervisor.clone();

    // Build router
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drain in-flight pipeline runs before exiting so no tour is left
    // mid-stage by a shutdown.
    info!("Shutting down; draining pipeline runs");
    supervisor.join_all().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
