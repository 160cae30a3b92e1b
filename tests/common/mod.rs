#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Bytes,
    http::{StatusCode, Uri, header::CONTENT_TYPE},
};
use serde_json::Value;
use tokio::net::TcpListener;

/// Every request the mock saw: (path, JSON body or Null).
pub type Hits = Arc<Mutex<Vec<(String, Value)>>>;

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Backend that answers every request with the same status and body.
pub async fn canned_backend(status: StatusCode, body: &'static str) -> (String, Hits) {
    let hits: Hits = Arc::default();
    let recorder = hits.clone();
    let app = Router::new().fallback(move |uri: Uri, payload: Bytes| {
        let recorder = recorder.clone();
        async move {
            let value = serde_json::from_slice(&payload).unwrap_or(Value::Null);
            recorder.lock().unwrap().push((uri.path().to_string(), value));
            (status, [(CONTENT_TYPE, "application/json")], body)
        }
    });
    (spawn(app).await, hits)
}

/// Base URL of a port nobody listens on.
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
