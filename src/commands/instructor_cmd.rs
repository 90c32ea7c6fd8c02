//! Instructor Commands
//!
//! Instructor CRUD and course assignments.

use axum::extract::{Path, State};
use serde::Deserialize;

use crate::domain::{normalize_email, DomainError, Instructor};
use crate::repository::Repository;
use super::{created, double_option, ok, ApiResult, CreatedResult, JsonBody, SharedState};

#[derive(Debug, Deserialize)]
pub struct CreateInstructorRequest {
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateInstructorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
}

pub async fn create_instructor(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<CreateInstructorRequest>,
) -> CreatedResult<Instructor> {
    let mut instructor = Instructor::new(req.name, req.email);
    instructor.bio = req.bio;

    let instructor = state.instructor_repo.create(&instructor).await?;
    log::info!("Created instructor {} ({})", instructor.id, instructor.email);
    created(instructor)
}

pub async fn list_instructors(State(state): State<SharedState>) -> ApiResult<Vec<Instructor>> {
    ok(state.instructor_repo.list().await?)
}

pub async fn get_instructor(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<Instructor> {
    let instructor = state
        .instructor_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Instructor {} not found", id)))?;
    ok(instructor)
}

pub async fn update_instructor(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateInstructorRequest>,
) -> ApiResult<Instructor> {
    let existing = state
        .instructor_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Instructor {} not found", id)))?;

    let updated = Instructor {
        name: req.name.unwrap_or(existing.name),
        email: req.email.as_deref().map(normalize_email).unwrap_or(existing.email),
        bio: req.bio.unwrap_or(existing.bio),
        ..existing
    };

    ok(state.instructor_repo.update(&updated).await?)
}

pub async fn delete_instructor(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.instructor_repo.delete(&id).await?;
    log::info!("Deleted instructor {}", id);
    ok(())
}

pub async fn list_course_instructors(
    State(state): State<SharedState>,
    Path(course_id): Path<String>,
) -> ApiResult<Vec<Instructor>> {
    ok(state.instructor_repo.list_by_course(&course_id).await?)
}

pub async fn assign_instructor(
    State(state): State<SharedState>,
    Path((course_id, instructor_id)): Path<(String, String)>,
) -> ApiResult<Vec<Instructor>> {
    state
        .instructor_repo
        .assign_to_course(&course_id, &instructor_id)
        .await?;
    ok(state.instructor_repo.list_by_course(&course_id).await?)
}

pub async fn unassign_instructor(
    State(state): State<SharedState>,
    Path((course_id, instructor_id)): Path<(String, String)>,
) -> ApiResult<Vec<Instructor>> {
    state
        .instructor_repo
        .unassign_from_course(&course_id, &instructor_id)
        .await?;
    ok(state.instructor_repo.list_by_course(&course_id).await?)
}
