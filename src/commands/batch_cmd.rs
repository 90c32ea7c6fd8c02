//! Batch Commands

use axum::extract::{Path, State};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::{Batch, DomainError};
use crate::repository::Repository;
use super::{created, double_option, ok, ApiResult, CreatedResult, JsonBody, SharedState};

#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    pub name: String,
    pub starts_on: Option<NaiveDate>,
    pub capacity: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBatchRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub starts_on: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub capacity: Option<Option<i64>>,
}

/// Create a batch under a course
pub async fn create_batch(
    State(state): State<SharedState>,
    Path(course_id): Path<String>,
    JsonBody(req): JsonBody<CreateBatchRequest>,
) -> CreatedResult<Batch> {
    let mut batch = Batch::new(course_id, req.name);
    batch.starts_on = req.starts_on;
    batch.capacity = req.capacity;

    created(state.batch_repo.create(&batch).await?)
}

pub async fn list_batches(
    State(state): State<SharedState>,
    Path(course_id): Path<String>,
) -> ApiResult<Vec<Batch>> {
    ok(state.batch_repo.list_by_course(&course_id).await?)
}

pub async fn get_batch(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Batch> {
    let batch = state
        .batch_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Batch {} not found", id)))?;
    ok(batch)
}

pub async fn update_batch(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateBatchRequest>,
) -> ApiResult<Batch> {
    let existing = state
        .batch_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Batch {} not found", id)))?;

    let updated = Batch {
        name: req.name.unwrap_or(existing.name),
        starts_on: req.starts_on.unwrap_or(existing.starts_on),
        capacity: req.capacity.unwrap_or(existing.capacity),
        ..existing
    };

    ok(state.batch_repo.update(&updated).await?)
}

/// Delete a batch with its sections, sessions and enrollments
pub async fn delete_batch(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<()> {
    state.batch_repo.delete(&id).await?;
    log::info!("Deleted batch {}", id);
    ok(())
}
