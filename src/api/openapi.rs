//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the media-relay REST API using
//! utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-relay REST API
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-relay REST API",
        version = "0.1.0",
        description = "Submit links for fetching and upload to storage, and track job status",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:9092", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::submit_job,
        crate::api::routes::list_jobs,
        crate::api::routes::get_job,

        // System
        crate::api::routes::health_check,
        crate::api::routes::get_config,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::JobId,
        crate::types::JobStatus,
        crate::types::Job,
        crate::types::Event,

        // Config types from config.rs
        crate::config::Config,
        crate::config::ServerConfig,
        crate::config::FetcherConfig,
        crate::config::StorageConfig,
        crate::config::CorsConfig,
        crate::config::JanitorConfig,
        crate::config::StatsConfig,

        // API request/response types from routes
        crate::api::routes::SubmitRequest,
        crate::api::routes::SubmitMessage,
        crate::api::routes::SubmitResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "jobs", description = "Jobs - Submit links and query their status"),
        (name = "system", description = "System endpoints - Health checks, configuration, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;
