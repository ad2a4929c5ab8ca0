//! System handlers: health, config, OpenAPI, events.

use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    response::{
        IntoResponse,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
};
use serde_json::json;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

/// Placeholder for secrets in API responses
const REDACTED: &str = "***";

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "jobs": state.relay.registry.len(),
        "in_flight": state.relay.in_flight(),
        "accepting": state.relay.is_accepting(),
    }))
}

/// GET /config - Current configuration (storage token redacted)
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "system",
    responses(
        (status = 200, description = "Effective configuration", body = crate::config::Config)
    )
)]
pub async fn get_config(State(state): State<AppState>) -> Json<crate::config::Config> {
    let mut config = (*state.config).clone();
    if !config.storage.token.is_empty() {
        config.storage.token = REDACTED.to_string();
    }
    Json(config)
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/api/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}

/// GET /events - Server-sent events stream
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "system",
    responses(
        (status = 200, description = "Server-sent events stream (text/event-stream)", content_type = "text/event-stream")
    )
)]
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = state.relay.subscribe();
    let stream = BroadcastStream::new(receiver);

    let sse_stream = stream.filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json_data) => Some(Ok(SseEvent::default().event(event.kind()).data(json_data))),
            Err(e) => {
                tracing::warn!("Failed to serialize event to JSON: {}", e);
                None
            }
        },
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("SSE client lagged, skipped {} events", skipped);
            Some(Ok(SseEvent::default().event("error").data(format!(
                r#"{{"error":"lagged","skipped":{}}}"#,
                skipped
            ))))
        }
    });

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}
