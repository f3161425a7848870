//! Domino Coordinator - fleet command and control.
//!
//! This is the main entry point for the coordinator service. Configuration
//! is loaded from the JSON file named by `CONFIG_PATH` (default
//! `coordinator.json`); `LISTEN_ADDR` overrides the configured listen
//! address.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domino_coordinator::{create_router, CoordinatorConfig, CoordinatorState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,domino=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Domino Coordinator");

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "coordinator.json".into());
    let mut config = CoordinatorConfig::from_file(&config_path)?;
    if let Ok(listen_addr) = std::env::var("LISTEN_ADDR") {
        config.listen_addr = listen_addr;
    }

    tracing::info!(
        listen_addr = %config.listen_addr,
        operation_timeout_seconds = config.operation_timeout_seconds,
        known_agents = config.known_agents.len(),
        "Coordinator configuration loaded"
    );

    let listen_addr = config.listen_addr.clone();
    let state = Arc::new(CoordinatorState::new(config));
    let app = create_router(state);

    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
