//! Handlers for the `/renders` resource.
//!
//! Submission is asynchronous: the job is registered and queued, and
//! the returned id is immediately queryable via the status endpoint.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use renderdeck_core::{CoreError, SubmitRender};
use renderdeck_orchestrator::DeleteOutcome;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Response body for a submitted render job.
#[derive(Debug, Serialize)]
pub struct SubmittedJob {
    pub job_id: String,
}

/// Query parameters for `GET /api/v1/renders`.
#[derive(Debug, Deserialize)]
pub struct ListRendersQuery {
    pub project_id: String,
}

/// Response body for `DELETE /api/v1/renders/{id}`.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/renders
///
/// Submit a render request. Returns 202 with the job id; the job is
/// queued and picked up as soon as a worker slot frees up.
pub async fn submit_render(
    State(state): State<AppState>,
    Json(input): Json<SubmitRender>,
) -> AppResult<impl IntoResponse> {
    if input.project_id.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "project_id must not be empty".into(),
        )));
    }

    let project_id = input.project_id.clone();
    let job_id = state.orchestrator.submit(input).await?;

    tracing::info!(job_id = %job_id, project_id = %project_id, "Render job accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: SubmittedJob { job_id },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Job status
// ---------------------------------------------------------------------------

/// GET /api/v1/renders/jobs/{id}
///
/// Current job record plus queue context. An id that raced its own
/// registration reads as a queued placeholder, never a 404.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    Ok(Json(DataResponse {
        data: state.orchestrator.status(&job_id),
    }))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// GET /api/v1/renders?project_id={id}
///
/// Completed renders for a project, newest first.
pub async fn list_renders(
    State(state): State<AppState>,
    Query(params): Query<ListRendersQuery>,
) -> AppResult<impl IntoResponse> {
    let records = state.orchestrator.list_renders(&params.project_id).await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/v1/renders/{id}
///
/// One completed render by id.
pub async fn get_render(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .orchestrator
        .find_render(&id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Render",
            id: id.clone(),
        }))?;

    Ok(Json(DataResponse { data: record }))
}

/// DELETE /api/v1/renders/{id}
///
/// Remove a render from the catalog and best-effort unlink its output
/// file. Unknown ids leave the catalog untouched.
pub async fn delete_render(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    match state.orchestrator.delete_render(&id).await? {
        DeleteOutcome::Deleted => {
            tracing::info!(record_id = %id, "Render deleted");
            Ok((
                StatusCode::OK,
                Json(DataResponse {
                    data: DeleteResponse {
                        ok: true,
                        reason: None,
                    },
                }),
            ))
        }
        DeleteOutcome::NotFound => Ok((
            StatusCode::NOT_FOUND,
            Json(DataResponse {
                data: DeleteResponse {
                    ok: false,
                    reason: Some("not_found"),
                },
            }),
        )),
    }
}
