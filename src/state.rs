// src/state.rs
use std::sync::Arc;

use reqwest::Client;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub http: Client,
    pub upstream_url: String,
}

impl AppState {
    pub fn new(upstream_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            upstream_url: upstream_url.into(),
        }
    }
}
