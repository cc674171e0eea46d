//! Z-API Client for WhatsApp
//!
//! Handles:
//! - Text message sending
//! - Image message sending (URL or base64, optional view-once)
//! - Registering the delivery-status webhook of an instance

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::RelayConfig;

/// Header carrying the account security token on every Z-API call
const CLIENT_TOKEN_HEADER: &str = "Client-Token";

// =============================================================================
// Z-API Client
// =============================================================================

/// Z-API REST client bound to the configured sending instance
#[derive(Clone)]
pub struct ZapiClient {
    base_url: String,
    instance_id: String,
    token: String,
    client_token: String,
    http_client: Client,
}

impl ZapiClient {
    /// Create a new Z-API client from relay configuration
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.zapi_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url: config.zapi_base_url.trim_end_matches('/').to_string(),
            instance_id: config.zapi_instance_id.clone(),
            token: config.zapi_token.clone(),
            client_token: config.zapi_client_token.clone(),
            http_client: builder.build().context("Failed to build HTTP client")?,
        })
    }

    /// URL of `action` for an arbitrary instance
    fn instance_url(&self, instance_id: &str, token: &str, action: &str) -> String {
        format!(
            "{}/instances/{}/token/{}/{}",
            self.base_url, instance_id, token, action
        )
    }

    /// URL of `action` for the configured sending instance
    fn action_url(&self, action: &str) -> String {
        self.instance_url(&self.instance_id, &self.token, action)
    }

    /// Send a text message
    pub async fn send_text(&self, phone: &str, message: &str) -> Result<Value> {
        let request = TextPayload { phone, message };

        debug!("Sending text message to {}", phone);

        let response = self
            .http_client
            .post(self.action_url("send-text"))
            .header(CLIENT_TOKEN_HEADER, &self.client_token)
            .json(&request)
            .send()
            .await
            .context("Failed to send text message request")?;

        let data = read_response(response, "send-text").await?;
        info!("Z-API send-text response: {}", data);
        Ok(data)
    }

    /// Send an image message
    pub async fn send_image(
        &self,
        phone: &str,
        image: &str,
        caption: &str,
        view_once: bool,
    ) -> Result<Value> {
        let request = ImagePayload {
            phone,
            image,
            caption,
            view_once,
        };

        debug!("Sending image message to {} (viewOnce={})", phone, view_once);

        let response = self
            .http_client
            .post(self.action_url("send-image"))
            .header(CLIENT_TOKEN_HEADER, &self.client_token)
            .json(&request)
            .send()
            .await
            .context("Failed to send image message request")?;

        let data = read_response(response, "send-image").await?;
        info!("Z-API send-image response: {}", data);
        Ok(data)
    }

    /// Point the delivery-status webhook of `instance_id` at `callback_url`
    ///
    /// Uses the caller-supplied instance credentials rather than the
    /// configured sending instance.
    pub async fn update_webhook_message_status(
        &self,
        instance_id: &str,
        token: &str,
        callback_url: &str,
    ) -> Result<Value> {
        let request = WebhookValuePayload {
            value: callback_url,
        };

        debug!(
            "Registering status webhook for instance {} -> {}",
            instance_id, callback_url
        );

        let response = self
            .http_client
            .put(self.instance_url(instance_id, token, "update-webhook-message-status"))
            .header(CLIENT_TOKEN_HEADER, &self.client_token)
            .json(&request)
            .send()
            .await
            .context("Failed to send webhook update request")?;

        let data = read_response(response, "update-webhook-message-status").await?;
        info!(
            "Status webhook registered for instance {}: {}",
            instance_id, data
        );
        Ok(data)
    }
}

/// Read a Z-API response body, failing on non-2xx statuses
///
/// The body is returned as JSON when it parses and as a JSON string otherwise.
async fn read_response(response: Response, action: &str) -> Result<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read {} response", action))?;
    let data = serde_json::from_str(&body).unwrap_or(Value::String(body));

    if !status.is_success() {
        error!("Z-API {} error: {} - {}", action, status, data);
        return Err(anyhow!("Z-API {} returned {}: {}", action, status, data));
    }

    Ok(data)
}

// =============================================================================
// Request Types
// =============================================================================

/// Text message request
#[derive(Debug, Serialize)]
struct TextPayload<'a> {
    phone: &'a str,
    message: &'a str,
}

/// Image message request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImagePayload<'a> {
    phone: &'a str,
    image: &'a str,
    caption: &'a str,
    view_once: bool,
}

/// Webhook update request
#[derive(Debug, Serialize)]
struct WebhookValuePayload<'a> {
    value: &'a str,
}

// =============================================================================
// Tests
// =============================================================================
