//! REST API server module
//!
//! Accepts submissions, answers status queries, and streams job events.

use crate::config::CorsConfig;
use crate::{Config, MediaRelay, Result};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Jobs
/// - `POST /api/process` - Submit free text containing a URL
/// - `GET /api/task_status` - List all jobs, newest first
/// - `GET /api/task_status/:id` - Get a single job
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/config` - Current config (storage token redacted)
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /api/events` - Server-sent events stream
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(relay: Arc<MediaRelay>, config: Arc<Config>) -> Router {
    let state = AppState::new(relay, config.clone());

    let router = Router::new()
        // Jobs
        .route("/api/process", post(routes::submit_job))
        .route("/api/task_status", get(routes::list_jobs))
        .route("/api/task_status/:id", get(routes::get_job))
        // System
        .route("/api/health", get(routes::health_check))
        .route("/api/config", get(routes::get_config))
        .route("/api/openapi.json", get(routes::openapi_spec))
        .route("/api/events", get(routes::event_stream));

    // SwaggerUi registers its own spec route, so it must not collide with /api/openapi.json
    let router = if config.server.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    router
        .with_state(state)
        .layer(build_cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
}

/// Build a CORS layer from the configured header values
///
/// Each field is a comma-separated list as it would appear in the response
/// header; `*` (or an empty list) allows anything.
fn build_cors_layer(cors: &CorsConfig) -> CorsLayer {
    let origins = split_list(&cors.allow_origin);
    let allow_origin = if is_wildcard(&origins) {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins.iter().filter_map(|o| o.parse::<HeaderValue>().ok()))
    };

    let methods = split_list(&cors.allow_methods);
    let allow_methods = if is_wildcard(&methods) {
        AllowMethods::from(Any)
    } else {
        AllowMethods::list(methods.iter().filter_map(|m| m.parse::<Method>().ok()))
    };

    let headers = split_list(&cors.allow_headers);
    let allow_headers = if is_wildcard(&headers) {
        AllowHeaders::from(Any)
    } else {
        AllowHeaders::list(headers.iter().filter_map(|h| h.parse::<HeaderName>().ok()))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(allow_methods)
        .allow_headers(allow_headers)
}

fn split_list(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

fn is_wildcard(items: &[&str]) -> bool {
    items.is_empty() || items.contains(&"*")
}

/// Start the API server on the configured bind address.
///
/// Runs until the server fails or the task is dropped. See
/// [`serve_with_shutdown`] for a server that stops on a signal.
///
/// # Example
///
/// ```no_run
/// use media_relay::{Config, MediaRelay};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let relay = Arc::new(MediaRelay::new((*config).clone())?);
///
/// // Start API server (blocks until shutdown)
/// media_relay::api::start_api_server(relay, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(relay: Arc<MediaRelay>, config: Arc<Config>) -> Result<()> {
    serve_with_shutdown(relay, config, std::future::pending::<()>()).await
}

/// Start the API server and stop accepting connections once `shutdown` completes.
///
/// Requests already in progress are allowed to finish.
pub async fn serve_with_shutdown<F>(
    relay: Arc<MediaRelay>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.bind_address();

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(relay, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
