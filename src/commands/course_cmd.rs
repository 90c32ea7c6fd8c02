//! Course Commands
//!
//! Course catalog CRUD.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use crate::domain::{Course, CourseView, DomainError};
use crate::repository::{Repository, SearchableRepository};
use super::{created, double_option, ok, ApiResult, CreatedResult, JsonBody, SharedState};

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price_cents: i64,
    pub discount_percent: Option<i32>,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub price_cents: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub discount_percent: Option<Option<i32>>,
    pub published: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CourseListQuery {
    /// Text search over title and description
    pub q: Option<String>,
    /// Only published courses
    pub published: Option<bool>,
}

/// Create a new course
pub async fn create_course(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<CreateCourseRequest>,
) -> CreatedResult<CourseView> {
    let mut course = Course::new(req.title, req.price_cents);
    course.description = req.description;
    course.discount_percent = req.discount_percent;
    course.published = req.published;

    let course = state.course_repo.create(&course).await?;
    log::info!("Created course {} ({})", course.id, course.title);
    created(course.into())
}

/// List courses, optionally filtered
pub async fn list_courses(
    State(state): State<SharedState>,
    Query(query): Query<CourseListQuery>,
) -> ApiResult<Vec<CourseView>> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let mut courses = match search {
        Some(q) => state.course_repo.search(q).await?,
        None if query.published == Some(true) => state.course_repo.list_published().await?,
        None => state.course_repo.list().await?,
    };
    if let Some(published) = query.published {
        courses.retain(|c| c.published == published);
    }
    ok(courses.into_iter().map(CourseView::from).collect())
}

pub async fn get_course(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<CourseView> {
    let course = state
        .course_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Course {} not found", id)))?;
    ok(course.into())
}

/// Update only the fields present in the body
pub async fn update_course(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateCourseRequest>,
) -> ApiResult<CourseView> {
    let existing = state
        .course_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Course {} not found", id)))?;

    let updated = Course {
        title: req.title.unwrap_or(existing.title),
        description: req.description.unwrap_or(existing.description),
        price_cents: req.price_cents.unwrap_or(existing.price_cents),
        discount_percent: req.discount_percent.unwrap_or(existing.discount_percent),
        published: req.published.unwrap_or(existing.published),
        ..existing
    };

    ok(state.course_repo.update(&updated).await?.into())
}

/// Delete a course and everything under it
pub async fn delete_course(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<()> {
    state.course_repo.delete(&id).await?;
    log::info!("Deleted course {}", id);
    ok(())
}
