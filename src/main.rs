//! Z-API WhatsApp Relay - Main Entry Point
//!
//! Serves the relay HTTP API:
//! 1. Sends text and image messages through Z-API and records them
//! 2. Stores inbound webhooks and delivery statuses from Z-API
//! 3. Lists what was stored

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zapi_relay::server::{self, AppState};
use zapi_relay::{MessageStore, RelayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,zapi_relay=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Z-API relay starting...");

    // Load configuration
    let config = RelayConfig::from_env()?;
    info!("📋 Configuration loaded");

    let store = MessageStore::new(&config.storage_path).with_context(|| {
        format!("Failed to open store at {}", config.storage_path.display())
    })?;
    info!("📦 Storage initialized at {:?}", config.storage_path);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address {}", config.listen_addr))?;
    let state = AppState::new(config, Arc::new(store))?;

    let http_server = tokio::spawn(async move {
        if let Err(e) = server::run_server(addr, state).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    info!("🌐 Relay listening on {}", addr);

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => info!("📢 Shutdown signal received"),
        Err(err) => tracing::error!("Unable to listen for shutdown signal: {}", err),
    }

    info!("🛑 Shutting down server...");
    http_server.abort();

    info!("✅ Z-API relay stopped");
    Ok(())
}
