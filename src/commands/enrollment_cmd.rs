//! Enrollment Commands
//!
//! Enrollment and progress tracking.

use axum::extract::{Path, State};
use serde::Deserialize;

use crate::domain::{Enrollment, ProgressSummary};
use super::{created, ok, ApiResult, CreatedResult, JsonBody, SharedState};

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    pub student_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub session_id: String,
    #[serde(default = "default_completed")]
    pub completed: bool,
}

fn default_completed() -> bool {
    true
}

pub async fn enroll(
    State(state): State<SharedState>,
    Path(batch_id): Path<String>,
    JsonBody(req): JsonBody<EnrollRequest>,
) -> CreatedResult<Enrollment> {
    created(state.enrollment_repo.enroll(&batch_id, req.student_id.trim()).await?)
}

pub async fn list_enrollments(
    State(state): State<SharedState>,
    Path(batch_id): Path<String>,
) -> ApiResult<Vec<Enrollment>> {
    ok(state.enrollment_repo.list_by_batch(&batch_id).await?)
}

/// Cancel an enrollment (the row is kept for history)
pub async fn cancel_enrollment(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Enrollment> {
    let enrollment = state.enrollment_repo.cancel(&id).await?;
    log::info!("Cancelled enrollment {}", id);
    ok(enrollment)
}

pub async fn set_progress(
    State(state): State<SharedState>,
    Path(enrollment_id): Path<String>,
    JsonBody(req): JsonBody<ProgressRequest>,
) -> ApiResult<ProgressSummary> {
    ok(state
        .enrollment_repo
        .set_progress(&enrollment_id, &req.session_id, req.completed)
        .await?)
}

pub async fn get_progress(
    State(state): State<SharedState>,
    Path(enrollment_id): Path<String>,
) -> ApiResult<ProgressSummary> {
    ok(state.enrollment_repo.progress(&enrollment_id).await?)
}
