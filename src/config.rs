//! Configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Relay server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    // =========================================================================
    // Z-API Credentials
    // =========================================================================
    /// Z-API instance used for outbound sends
    pub zapi_instance_id: String,

    /// Z-API instance token
    pub zapi_token: String,

    /// Account-level security token sent as the `Client-Token` header
    pub zapi_client_token: String,

    /// Z-API base URL (overridable for staging or tests)
    #[serde(default = "default_zapi_base_url")]
    pub zapi_base_url: String,

    /// Optional request timeout for provider calls, in seconds
    #[serde(default)]
    pub zapi_timeout_secs: Option<u64>,

    // =========================================================================
    // Relay Configuration
    // =========================================================================
    /// Public URL this relay is reachable at (used for status callbacks)
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// HTTP server bind address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// SQLite database path
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Enable debug mode (log raw webhook payloads)
    #[serde(default)]
    pub debug_mode: bool,
}

fn default_zapi_base_url() -> String {
    "https://api.z-api.io".to_string()
}

fn default_public_base_url() -> String {
    "https://whatsapp-zapi-v01.vercel.app".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/zapi-relay.db")
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let zapi_instance_id =
            std::env::var("ZAPI_INSTANCE_ID").context("ZAPI_INSTANCE_ID is required")?;
        let zapi_token = std::env::var("ZAPI_TOKEN").context("ZAPI_TOKEN is required")?;
        let zapi_client_token =
            std::env::var("ZAPI_CLIENT_TOKEN").context("ZAPI_CLIENT_TOKEN is required")?;

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(addr) => addr,
            Err(_) => std::env::var("PORT")
                .map(|port| format!("0.0.0.0:{}", port.trim()))
                .unwrap_or_else(|_| default_listen_addr()),
        };

        Ok(Self {
            zapi_instance_id,
            zapi_token,
            zapi_client_token,
            zapi_base_url: std::env::var("ZAPI_BASE_URL")
                .unwrap_or_else(|_| default_zapi_base_url()),
            zapi_timeout_secs: std::env::var("ZAPI_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok()),

            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| default_public_base_url()),
            listen_addr,
            storage_path: std::env::var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_storage_path()),
            debug_mode: std::env::var("DEBUG_MODE").is_ok(),
        })
    }

    /// Callback URL the provider should post delivery statuses to for `instance`
    pub fn status_callback_url(&self, instance: &str) -> String {
        format!(
            "{}/instancia/{}/status",
            self.public_base_url.trim_end_matches('/'),
            instance
        )
    }
}
