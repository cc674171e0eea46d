//! HTTP server: shared state, router and request logging

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::RelayConfig;
use crate::messages;
use crate::storage::MessageStore;
use crate::webhook;
use crate::zapi_api::ZapiClient;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub zapi: ZapiClient,
    pub store: Arc<MessageStore>,
}

impl AppState {
    pub fn new(config: RelayConfig, store: Arc<MessageStore>) -> anyhow::Result<Self> {
        let zapi = ZapiClient::new(&config)?;
        Ok(Self {
            config,
            zapi,
            store,
        })
    }
}

/// Build the relay router
pub fn router(state: AppState) -> Router {
    Router::new()
        // Outbound messages
        .route("/enviar", post(messages::send_text))
        .route("/enviar-imagem", post(messages::send_image))
        .route("/mensagens", get(messages::list_messages))
        // Z-API callbacks
        .route("/webhook", post(webhook::receive_webhook))
        .route("/limpar-mensagens", delete(webhook::purge_webhooks))
        .route("/instancia/{instancia}/status", post(webhook::receive_status))
        .route(
            "/configurar-webhook-status",
            post(webhook::configure_status_webhook),
        )
        .route("/status", get(webhook::list_statuses))
        .route("/health", get(health_check))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the relay HTTP server
pub async fn run_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Middleware to log all incoming HTTP requests
async fn log_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let query = uri.query().map(|q| format!("?{}", q)).unwrap_or_default();

    info!("🌐 HTTP {} {}{}", method, uri.path(), query);

    let response = next.run(req).await;

    info!("📤 Response status: {}", response.status());

    response
}
