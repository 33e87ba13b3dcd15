//! Registration surface tests: forwarding order, introspection, harness
//! dispatch, and the Ready-only contract.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_host::routing::RouterFacade;
use http_host::{EventBus, ExecutionMode, HttpServer, ServerConfig, ServerError, ServerState};
use tokio::time::timeout;

mod common;
use common::wait_for_state;

async fn test_server(port: u16) -> Arc<HttpServer> {
    let events = Arc::new(EventBus::new());
    let config = ServerConfig::with_port(port, ExecutionMode::Test);
    Arc::new(HttpServer::init(config, events).await.unwrap())
}

#[tokio::test]
async fn test_journal_lists_registrations_in_order() {
    let server = test_server(0).await;
    server.get("/a", || async { "a" }).unwrap();
    server.post("/a", || async { "a" }).unwrap();
    server.put("/b", || async { "b" }).unwrap();

    let methods: Vec<_> = server.routes().iter().map(|e| e.method).collect();
    assert_eq!(methods, vec!["GET", "POST", "PUT"]);
}

#[tokio::test]
async fn test_test_mode_has_no_default_middleware() {
    let server = test_server(0).await;
    assert!(server.middleware().is_empty());
}

#[tokio::test]
async fn test_live_mode_attaches_request_logging() {
    let events = Arc::new(EventBus::new());
    let config = ServerConfig::with_port(0, ExecutionMode::Live);
    let server = HttpServer::init(config, events).await.unwrap();
    assert_eq!(server.middleware(), vec!["request-logging".to_string()]);
}

#[tokio::test]
async fn test_registrations_visible_to_dispatch() {
    let server = test_server(0).await;
    server.get("/widget", || async { "got" }).unwrap();
    server
        .post("/widget", || async { (StatusCode::CREATED, "made") })
        .unwrap();

    let mut api = RouterFacade::new();
    api.get("/nested", || async { "nested" });
    server.nest("/api", api).unwrap();

    let start_server = server.clone();
    let start_task = tokio::spawn(async move { start_server.start().await });
    assert!(wait_for_state(&server, ServerState::Live, Duration::from_secs(2)).await);

    let client = server.harness_client().unwrap();

    let get = client.get("/widget").await.unwrap();
    assert_eq!(get.status(), StatusCode::OK);

    let post = client
        .request(
            Request::builder()
                .method("POST")
                .uri("/widget")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(post.status(), StatusCode::CREATED);

    let nested = client.get("/api/nested").await.unwrap();
    assert_eq!(nested.status(), StatusCode::OK);

    let miss = client.get("/absent").await.unwrap();
    assert_eq!(miss.status(), StatusCode::NOT_FOUND);

    server.shutdown().unwrap();
    timeout(Duration::from_secs(2), start_task).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_registration_after_start_rejected() {
    let server = test_server(0).await;
    let start_server = server.clone();
    let start_task = tokio::spawn(async move { start_server.start().await });
    assert!(wait_for_state(&server, ServerState::Live, Duration::from_secs(2)).await);

    let result = server.get("/late", || async { "late" });
    assert!(matches!(result, Err(ServerError::AlreadyStarted)));

    server.shutdown().unwrap();
    timeout(Duration::from_secs(2), start_task).await.unwrap().unwrap().unwrap();
}

#[tokio::test]
async fn test_harness_client_gated_by_mode_and_state() {
    // Before start: no client yet.
    let server = test_server(0).await;
    assert!(matches!(
        server.harness_client(),
        Err(ServerError::NotStarted)
    ));

    // Live mode: never a harness client.
    let events = Arc::new(EventBus::new());
    let live = HttpServer::init(
        ServerConfig::with_port(0, ExecutionMode::Live),
        events,
    )
    .await
    .unwrap();
    assert!(matches!(
        live.harness_client(),
        Err(ServerError::WrongMode(ExecutionMode::Live))
    ));
}
