mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{canned_backend, closed_port};
use textbook_chat::message::{ErrorBody, HealthStatus};
use textbook_chat::routes::create_router;
use textbook_chat::state::AppState;
use tower::util::ServiceExt;

fn post(uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = Arc::new(AppState::new("http://unused"));
    let app = create_router("public").with_state(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthStatus = body_json(response).await;
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_chat_is_forwarded_upstream() {
    let (upstream, hits) = canned_backend(StatusCode::OK, r#"{"answer":"forwarded"}"#).await;
    let app = create_router("public").with_state(Arc::new(AppState::new(upstream)));

    let response = app
        .oneshot(post("/api/chat", r#"{"query":"hi","top_k":3,"chapter_slug":null}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(response).await;
    assert_eq!(body["answer"], "forwarded");

    let hits = hits.lock().unwrap();
    assert_eq!(hits[0].0, "/chat");
    assert_eq!(hits[0].1["query"], "hi");
}

#[tokio::test]
async fn test_upstream_errors_pass_through() {
    let (upstream, hits) = canned_backend(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#).await;
    let app = create_router("public").with_state(Arc::new(AppState::new(upstream)));

    let response = app
        .oneshot(post(
            "/api/ask-selection",
            r#"{"selected_text":"joint","question":"why?","chapter_slug":null}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = body_json(response).await;
    assert_eq!(body.message(), Some("boom"));
    assert_eq!(hits.lock().unwrap()[0].0, "/ask-selection");
}

#[tokio::test]
async fn test_unreachable_upstream_is_bad_gateway() {
    let app = create_router("public").with_state(Arc::new(AppState::new(closed_port().await)));

    let response = app
        .oneshot(post("/api/chat", r#"{"query":"hi"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: ErrorBody = body_json(response).await;
    assert!(body.message().unwrap().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_empty_body_is_rejected() {
    let (upstream, hits) = canned_backend(StatusCode::OK, "{}").await;
    let app = create_router("public").with_state(Arc::new(AppState::new(upstream)));

    let response = app.oneshot(post("/api/chat", "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(hits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_client_through_gateway() {
    use textbook_chat::services::client::{ChatBackend, ChatClient};

    let (upstream, _) = canned_backend(StatusCode::OK, r#"{"answer":"via proxy"}"#).await;
    let gateway = create_router("public").with_state(Arc::new(AppState::new(upstream)));
    let site = common::spawn(gateway).await;

    // A deployed page resolves to "/api" on its own origin.
    let client = ChatClient::new(format!("{site}/api"));
    assert!(client.check_health().await);
    let response = client.send_chat_message("hi", None, None).await.unwrap();
    assert_eq!(response.answer, "via proxy");
}
