// src/routes/mod.rs
pub mod proxy;

use std::path::Path;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{get, post},
};
use proxy::{ask_selection_proxy_handler, chat_proxy_handler, health_handler};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Same-origin gateway: `/api/*` reaches the retrieval service, everything
/// else is the static site.
pub fn create_router(static_dir: impl AsRef<Path>) -> Router<SharedState> {
    let api_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_proxy_handler))
        .route("/ask-selection", post(ask_selection_proxy_handler));

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
}
