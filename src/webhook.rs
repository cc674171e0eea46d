//! Z-API webhook handlers
//!
//! Inbound message webhooks are stored verbatim; delivery-status callbacks
//! are stored per instance.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::server::AppState;
use crate::storage::DeliveryStatus;
use crate::types::{
    WebhookSetupRequest, delivery_status_from_body, parse_json_body, raw_json_body,
};

/// Store an inbound webhook (`POST /webhook`)
///
/// Every JSON delivery is acknowledged, whatever its shape, so Z-API does not
/// keep redelivering it. The body text is stored exactly as received.
pub async fn receive_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, &'static str), AppError> {
    let raw_payload = raw_json_body(&body)?;

    if state.config.debug_mode {
        debug!("Webhook payload: {}", raw_payload);
    }

    let record = state
        .store
        .save_received_webhook(&raw_payload, Utc::now())
        .map_err(|e| {
            error!("Erro ao salvar mensagem recebida: {}", e);
            AppError::Internal("Erro interno ao servidor".to_string())
        })?;

    info!("📥 Webhook {} received ({} bytes)", record.id, raw_payload.len());
    Ok((StatusCode::OK, "OK"))
}

/// Delete every stored webhook except the latest (`DELETE /limpar-mensagens`)
pub async fn purge_webhooks(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let outcome = state.store.purge_received_webhooks().map_err(|e| {
        error!("Erro ao limpar mensagens: {}", e);
        AppError::Internal("Erro ao limpar mensagens".to_string())
    })?;

    match outcome {
        Some(outcome) => {
            info!(
                "🧹 Removed {} webhooks, kept {}",
                outcome.deleted, outcome.kept_id
            );
            Ok(Json(json!({ "message": "Mensagens limpas com sucesso" })))
        }
        None => Err(AppError::NotFound("Nenhuma mensagem encontrada".to_string())),
    }
}

/// Store a delivery status callback (`POST /instancia/{instancia}/status`)
///
/// Body fields are not validated; a body that is not JSON is stored as an
/// empty status.
pub async fn receive_status(
    State(state): State<AppState>,
    Path(instancia): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let payload = parse_json_body(&body).unwrap_or_else(|e| {
        warn!(
            "Status body from instance {} is not JSON, storing empty status: {}",
            instancia, e
        );
        Value::Null
    });
    info!("Status recebido da instancia {}", instancia);
    debug!("Status payload: {}", payload);

    let status = delivery_status_from_body(&payload);
    let record = state
        .store
        .save_delivery_status(&instancia, &status)
        .map_err(|e| {
            error!("Erro ao processar status: {}", e);
            AppError::Internal("Erro interno".to_string())
        })?;

    debug!("Delivery status {} stored: {:?}", record.id, record.status);
    Ok(Json(
        json!({ "success": true, "message": "Status recebido com sucesso" }),
    ))
}

/// Register this relay as the status webhook of an instance
/// (`POST /configurar-webhook-status`)
pub async fn configure_status_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request = WebhookSetupRequest::from_body(&parse_json_body(&body)?);
    let callback_url = state.config.status_callback_url(&request.instancia);

    let resposta = state
        .zapi
        .update_webhook_message_status(&request.instancia, &request.token, &callback_url)
        .await
        .map_err(|e| {
            error!("❌ Erro ao configurar webhook: {:#}", e);
            AppError::Upstream("Erro ao configurar webhook".to_string())
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Webhook configurado com sucesso",
        "resposta": resposta,
    })))
}

/// List stored delivery statuses in arrival order (`GET /status`)
pub async fn list_statuses(
    State(state): State<AppState>,
) -> Result<Json<Vec<DeliveryStatus>>, AppError> {
    let statuses = state.store.list_delivery_statuses().map_err(|e| {
        error!("Erro ao buscar status: {}", e);
        AppError::Internal("Erro interno".to_string())
    })?;

    Ok(Json(statuses))
}
