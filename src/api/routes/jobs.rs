//! Job submission and status handlers.

use super::{SubmitRequest, SubmitResponse};
use crate::api::AppState;
use crate::error::{ApiError, Error};
use crate::types::{Job, JobId};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// POST /process - Submit free text for processing
#[utoipa::path(
    post,
    path = "/api/process",
    tag = "jobs",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Job registered, processing continues in the background", body = SubmitResponse),
        (status = 400, description = "Malformed body, or no http(s) URL in the text", body = crate::error::ApiError),
        (status = 503, description = "Shutting down", body = crate::error::ApiError)
    )
)]
pub async fn submit_job(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, Error> {
    let Json(request) = payload.map_err(|rejection| Error::InvalidBody(rejection.body_text()))?;

    let id = state.relay.submit(&request.message.text).inspect_err(|e| {
        tracing::debug!(error = %e, "Submission refused");
    })?;

    Ok(Json(SubmitResponse::submitted(id)))
}

/// GET /task_status - List all jobs, newest first
#[utoipa::path(
    get,
    path = "/api/task_status",
    tag = "jobs",
    responses(
        (status = 200, description = "Every job in the registry", body = Vec<crate::types::Job>)
    )
)]
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.relay.jobs())
}

/// GET /task_status/:id - Get a single job
#[utoipa::path(
    get,
    path = "/api/task_status/{id}",
    tag = "jobs",
    params(
        ("id" = i64, Path, description = "Job ID (submission timestamp)")
    ),
    responses(
        (status = 200, description = "Job", body = crate::types::Job),
        (status = 404, description = "Job not found", body = crate::error::ApiError)
    )
)]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.relay.job(JobId(id)) {
        Some(job) => (StatusCode::OK, Json(job)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiError::not_found(format!("job {id} not found"))),
        )
            .into_response(),
    }
}
