//! HTTP error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Request-scoped failure, rendered as `{"sucesso": false, "erro": ...}`
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed client input
    #[error("Invalid input: {0}")]
    Validation(String),
    /// Z-API unreachable or answered with a non-2xx status
    #[error("Upstream error: {0}")]
    Upstream(String),
    /// Store failure
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Validation(msg)
            | AppError::Upstream(msg)
            | AppError::Internal(msg)
            | AppError::NotFound(msg) => msg,
        };
        (status, Json(json!({ "sucesso": false, "erro": message }))).into_response()
    }
}
