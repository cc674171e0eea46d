//! Request types for the relay HTTP API
//!
//! Bodies are parsed from raw JSON instead of typed extractors: the web client
//! may send phones as numbers, and provider callbacks carry no fixed schema.

use axum::body::Bytes;
use serde_json::{Map, Value, value::RawValue};

use crate::error::AppError;
use crate::storage::NewDeliveryStatus;

// =============================================================================
// Body Helpers
// =============================================================================

/// Parse a request body as JSON; an empty body is an empty object
pub fn parse_json_body(body: &Bytes) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("Corpo da requisição não é um JSON válido: {e}")))
}

/// Validate a request body as JSON and return its exact text
///
/// Key order and number formatting are kept as sent; only whitespace around
/// the value is dropped. An empty body is an empty object.
pub fn raw_json_body(body: &Bytes) -> Result<String, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok("{}".to_string());
    }

    serde_json::from_slice::<Box<RawValue>>(body)
        .map(|raw| raw.get().to_string())
        .map_err(|e| AppError::Validation(format!("Corpo da requisição não é um JSON válido: {e}")))
}

/// Text of a field that must be filled in
///
/// Non-empty strings and non-zero numbers count as filled; anything else,
/// including `false` and `null`, counts as missing.
pub fn required_text(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

/// Text of an unvalidated field; non-string values keep their JSON form
pub fn loose_text(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// =============================================================================
// Outbound Requests
// =============================================================================

/// `POST /enviar` body
#[derive(Debug, Clone, PartialEq)]
pub struct SendTextRequest {
    pub phone: String,
    pub message: String,
}

impl SendTextRequest {
    pub fn from_body(body: &Value) -> Result<Self, AppError> {
        match (required_text(body, "phone"), required_text(body, "message")) {
            (Some(phone), Some(message)) => Ok(Self { phone, message }),
            _ => Err(AppError::Validation(
                "Telefone e mensagem são obrigatórios".to_string(),
            )),
        }
    }
}

/// `POST /enviar-imagem` body
#[derive(Debug, Clone, PartialEq)]
pub struct SendImageRequest {
    pub phone: String,
    pub image: String,
    pub caption: String,
    pub view_once: bool,
}

impl SendImageRequest {
    pub fn from_body(body: &Value) -> Result<Self, AppError> {
        let phone = required_text(body, "phone");
        let image = required_text(body, "image");
        let caption = required_text(body, "caption");
        let view_once = body.get("viewOnce").filter(|v| !v.is_null());

        let (Some(phone), Some(image), Some(caption), Some(view_once)) =
            (phone, image, caption, view_once)
        else {
            return Err(AppError::Validation(
                "Preencha todos os campos da requisição".to_string(),
            ));
        };

        let Some(view_once) = view_once.as_bool() else {
            return Err(AppError::Validation(
                "O campo viewOnce deve ser um booleano".to_string(),
            ));
        };

        Ok(Self {
            phone,
            image,
            caption,
            view_once,
        })
    }
}

// =============================================================================
// Provider Callbacks
// =============================================================================

/// Delivery status fields from a `POST /instancia/{instancia}/status` body
pub fn delivery_status_from_body(body: &Value) -> NewDeliveryStatus {
    NewDeliveryStatus {
        message_id: loose_text(body, "messageId"),
        status: loose_text(body, "status"),
        phone: loose_text(body, "phone"),
    }
}

/// `POST /configurar-webhook-status` body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebhookSetupRequest {
    pub instancia: String,
    pub token: String,
}

impl WebhookSetupRequest {
    pub fn from_body(body: &Value) -> Self {
        Self {
            instancia: loose_text(body, "instancia").unwrap_or_default(),
            token: loose_text(body, "token").unwrap_or_default(),
        }
    }
}
