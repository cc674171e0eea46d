//! Outbound message handlers: send through Z-API, then record the send

use axum::{Json, body::Bytes, extract::State};
use serde_json::{Value, json};
use tracing::{error, info};

use crate::error::AppError;
use crate::server::AppState;
use crate::storage::SentMessage;
use crate::types::{SendImageRequest, SendTextRequest, parse_json_body};

/// Send a text message (`POST /enviar`)
///
/// A store failure after Z-API accepted the message is reported as an error,
/// but the message has already left and is not recalled.
pub async fn send_text(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request = SendTextRequest::from_body(&parse_json_body(&body)?)?;

    state
        .zapi
        .send_text(&request.phone, &request.message)
        .await
        .map_err(|e| {
            error!("Erro ao enviar mensagem para {}: {:#}", request.phone, e);
            AppError::Upstream("Erro ao enviar mensagem".to_string())
        })?;

    state
        .store
        .save_sent_message(&request.phone, &request.message)
        .map_err(|e| {
            error!(
                "Message to {} was sent but could not be recorded: {}",
                request.phone, e
            );
            AppError::Internal("Mensagem enviada, mas não foi possível registrá-la".to_string())
        })?;

    info!("✉️ Text message sent to {}", request.phone);
    Ok(Json(
        json!({ "sucesso": true, "mensagem": "Mensagem enviada com sucesso!" }),
    ))
}

/// Send an image message (`POST /enviar-imagem`)
pub async fn send_image(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let request = SendImageRequest::from_body(&parse_json_body(&body)?)?;

    state
        .zapi
        .send_image(
            &request.phone,
            &request.image,
            &request.caption,
            request.view_once,
        )
        .await
        .map_err(|e| {
            error!("Erro ao enviar imagem para {}: {:#}", request.phone, e);
            AppError::Upstream("Erro ao enviar mensagem".to_string())
        })?;

    state
        .store
        .save_sent_image(
            &request.phone,
            &request.image,
            &request.caption,
            request.view_once,
        )
        .map_err(|e| {
            error!(
                "Image to {} was sent but could not be recorded: {}",
                request.phone, e
            );
            AppError::Internal("Imagem enviada, mas não foi possível registrá-la".to_string())
        })?;

    info!("🖼️ Image message sent to {}", request.phone);
    Ok(Json(
        json!({ "sucesso": true, "message": "Mensagem enviada com sucesso" }),
    ))
}

/// List sent text messages, newest first (`GET /mensagens`)
pub async fn list_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<SentMessage>>, AppError> {
    let messages = state.store.list_sent_messages().map_err(|e| {
        error!("Erro ao carregar mensagens: {}", e);
        AppError::Internal("Erro ao buscar mensagens".to_string())
    })?;

    Ok(Json(messages))
}
