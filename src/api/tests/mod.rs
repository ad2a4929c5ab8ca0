use super::*;
use crate::relay::test_helpers::{TestRelay, create_test_relay, video_post, wait_for_terminal};
use crate::types::{Job, JobId, JobStatus};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;


/// Helper to create a router over a test relay.
/// The returned TestRelay owns the mock services and must be kept alive.
async fn create_test_app() -> (Router, Arc<MediaRelay>, TestRelay) {
    let test = create_test_relay().await;
    let relay = Arc::new(test.relay.clone());
    let app = create_router(relay.clone(), relay.get_config());
    (app, relay, test)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns_and_stops_on_signal() {
    let test = create_test_relay().await;

    let mut config = (*test.relay.get_config()).clone();
    config.server.host = "127.0.0.1".parse().unwrap();
    config.server.port = 0; // OS assigns a free port
    let config = Arc::new(config);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(serve_with_shutdown(
        Arc::new(test.relay.clone()),
        config,
        async move {
            stop_rx.await.ok();
        },
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after the shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_preflight_uses_configured_values() {
    let (app, _relay, _test) = create_test_app().await;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/process")
        .header("Origin", "http://example.com")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    let methods = headers
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"), "allowed methods: {methods}");
    assert!(methods.contains("OPTIONS"), "allowed methods: {methods}");
    let allowed_headers = headers
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(allowed_headers.contains("content-type"));
}

#[test]
fn test_cors_specific_origin_list() {
    let cors = crate::config::CorsConfig {
        allow_origin: "https://a.example, https://b.example".into(),
        allow_methods: "*".into(),
        allow_headers: "".into(),
    };

    // Building must not panic for explicit lists or wildcards
    let _layer = build_cors_layer(&cors);
    assert_eq!(
        split_list(&cors.allow_origin),
        ["https://a.example", "https://b.example"]
    );
    assert!(is_wildcard(&split_list(&cors.allow_methods)));
    assert!(is_wildcard(&split_list(&cors.allow_headers)));
}

#[tokio::test]
async fn test_swagger_ui_can_be_disabled() {
    let test = create_test_relay().await;
    let mut config = (*test.relay.get_config()).clone();
    config.server.swagger_ui = false;
    let app = create_router(Arc::new(test.relay.clone()), Arc::new(config));

    let response = app.oneshot(get_request("/swagger-ui")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
