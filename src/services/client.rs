// src/services/client.rs
use std::future::Future;

use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::message::{AskSelectionRequest, AskSelectionResponse, ChatRequest, ChatResponse, ErrorBody};
use crate::services::gateway::endpoint;

pub const DEFAULT_TOP_K: u32 = 3;

/// The two question endpoints, as seen by the state machines.
///
/// Callers trim and validate input; implementations send whatever they get.
pub trait ChatBackend {
    fn send_chat_message(
        &self,
        query: &str,
        top_k: Option<u32>,
        chapter_slug: Option<&str>,
    ) -> impl Future<Output = Result<ChatResponse, ClientError>> + Send;

    fn ask_selection(
        &self,
        selected_text: &str,
        question: &str,
        chapter_slug: Option<&str>,
    ) -> impl Future<Output = Result<AskSelectionResponse, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    base_url: String,
    default_top_k: u32,
}

impl ChatClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(Client::new(), base_url)
    }

    pub fn with_http(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            default_top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_default_top_k(mut self, top_k: u32) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Liveness probe. Any failure, transport or status, reads as "down".
    pub async fn check_health(&self) -> bool {
        let url = endpoint(&self.base_url, "health");
        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!(%url, status = %response.status(), "health check failed");
                false
            }
            Err(err) => {
                warn!(%url, error = %err, "health check failed");
                false
            }
        }
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ClientError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, path);
        debug!(%url, "calling backend");

        let response = self.http.post(&url).json(body).send().await.map_err(|err| {
            warn!(%url, error = %err, "request did not reach backend");
            ClientError::Transport(err.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            // Unreadable error bodies fall through to the status-only message.
            let body: ErrorBody = response.json().await.unwrap_or_default();
            let message = body
                .message()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            warn!(%url, status = status.as_u16(), %message, "backend returned an error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| {
            warn!(%url, error = %err, "backend returned a malformed body");
            ClientError::Decode(err.to_string())
        })
    }
}

impl ChatBackend for ChatClient {
    async fn send_chat_message(
        &self,
        query: &str,
        top_k: Option<u32>,
        chapter_slug: Option<&str>,
    ) -> Result<ChatResponse, ClientError> {
        let request = ChatRequest {
            query: query.to_string(),
            top_k: top_k.unwrap_or(self.default_top_k),
            chapter_slug: chapter_slug.map(str::to_owned),
        };
        self.post_json("chat", &request).await
    }

    async fn ask_selection(
        &self,
        selected_text: &str,
        question: &str,
        chapter_slug: Option<&str>,
    ) -> Result<AskSelectionResponse, ClientError> {
        let request = AskSelectionRequest {
            selected_text: selected_text.to_string(),
            question: question.to_string(),
            chapter_slug: chapter_slug.map(str::to_owned),
        };
        self.post_json("ask-selection", &request).await
    }
}
