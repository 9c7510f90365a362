//! sensor-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use sensor_gateway::config::{GatewayConfig, LogFormat};
use sensor_gateway::server::{build_app, build_state};
use sensor_gateway::store::{MemoryStore, PostgresStore, SensorStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(addr = %config.listen_addr, "starting sensor-gateway");

    // Build store
    let store: Arc<dyn SensorStore> = if config.persistence_enabled {
        let store = PostgresStore::connect(&config).await?;
        tracing::info!("connected to postgres");
        Arc::new(store)
    } else {
        tracing::warn!("persistence disabled, using an empty in-memory store");
        Arc::new(MemoryStore::new())
    };

    // Build services and router
    let app = build_app(build_state(store, &config));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
