// src/error.rs
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::message::ErrorBody;

/// Failure at the client boundary. Every variant renders with the same
/// `Failed to get response:` envelope so callers can show it as-is.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// Backend answered with a non-2xx status.
    #[error("Failed to get response: {message}")]
    Status { status: u16, message: String },

    /// DNS, connection, timeout or URL construction failure.
    #[error("Failed to get response: {0}")]
    Transport(String),

    /// 2xx response whose body was not the expected JSON.
    #[error("Failed to get response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Errors raised by the gateway server's own handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("upstream unavailable: {0}")]
    BadGateway(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody {
            error: Some(self.to_string()),
            detail: None,
        };
        (status, Json(body)).into_response()
    }
}
