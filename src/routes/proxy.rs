// src/routes/proxy.rs
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::{
    error::AppError,
    message::HealthStatus,
    services::gateway::endpoint,
    state::SharedState,
};

pub async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
    })
}

pub async fn chat_proxy_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Response, AppError> {
    forward(&state, "chat", body).await
}

pub async fn ask_selection_proxy_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Response, AppError> {
    forward(&state, "ask-selection", body).await
}

/// Relay a JSON POST to the retrieval service; status and body pass through.
async fn forward(state: &SharedState, path: &str, body: Bytes) -> Result<Response, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("Request body is required".to_string()));
    }

    let url = endpoint(&state.upstream_url, path);
    debug!(%url, bytes = body.len(), "forwarding to upstream");

    let upstream = state
        .http
        .post(&url)
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|err| {
            error!(%url, error = %err, "upstream request failed");
            AppError::BadGateway(err.to_string())
        })?;

    let status = upstream.status();
    let content_type = upstream.headers().get(CONTENT_TYPE).cloned();
    let bytes = upstream
        .bytes()
        .await
        .map_err(|err| AppError::BadGateway(err.to_string()))?;

    let mut response = (status, bytes).into_response();
    if let Some(content_type) = content_type {
        response.headers_mut().insert(CONTENT_TYPE, content_type);
    }
    Ok(response)
}
