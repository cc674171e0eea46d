//! Z-API WhatsApp Relay Library
//!
//! A small HTTP relay between a web client and the Z-API WhatsApp provider.
//!
//! # Architecture
//!
//! ```text
//! Web client ──HTTP──▶ Relay (this) ──HTTPS──▶ Z-API
//!                        │    ▲
//!                        │    └── webhooks / delivery statuses
//!                        └── SQLite store
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Set environment variables
//! export ZAPI_INSTANCE_ID=your_instance
//! export ZAPI_TOKEN=your_token
//! export ZAPI_CLIENT_TOKEN=your_client_token
//! export PUBLIC_BASE_URL=https://relay.example.com  # optional
//!
//! # Run
//! zapi-relay
//! ```
//!
//! ```json
//! // POST /enviar
//! {"phone": "5511999999999", "message": "Olá!"}
//!
//! // POST /enviar-imagem
//! {"phone": "5511999999999", "image": "https://...", "caption": "Foto", "viewOnce": false}
//! ```

pub mod config;
pub mod error;
pub mod messages;
pub mod server;
pub mod storage;
pub mod types;
pub mod webhook;
pub mod zapi_api;

pub use config::RelayConfig;
pub use error::AppError;
pub use server::{AppState, router};
pub use storage::MessageStore;
pub use zapi_api::ZapiClient;
