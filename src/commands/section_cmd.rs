//! Section Commands

use axum::extract::{Path, State};
use serde::Deserialize;

use crate::domain::{DomainError, Section};
use crate::repository::Repository;
use super::{created, ok, optional_order, ApiResult, CreatedResult, JsonBody, SharedState};

#[derive(Debug, Deserialize)]
pub struct CreateSectionRequest {
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSectionRequest {
    pub title: Option<String>,
    /// Requested 1-based position within the batch
    #[serde(default)]
    pub order: Option<serde_json::Value>,
}

/// Create a section at the end of a batch
pub async fn create_section(
    State(state): State<SharedState>,
    Path(batch_id): Path<String>,
    JsonBody(req): JsonBody<CreateSectionRequest>,
) -> CreatedResult<Section> {
    let section = Section::new(batch_id, req.title, 0);
    created(state.section_repo.create(&section).await?)
}

pub async fn list_sections(
    State(state): State<SharedState>,
    Path(batch_id): Path<String>,
) -> ApiResult<Vec<Section>> {
    ok(state.section_repo.list_by_batch(&batch_id).await?)
}

/// Rename and/or reorder a section
pub async fn update_section(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateSectionRequest>,
) -> ApiResult<Section> {
    let requested = optional_order(req.order.as_ref())?;

    let mut section = state
        .section_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Section {} not found", id)))?;

    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Section title is required".into()));
        }
        if title != section.title {
            section.title = title;
            section = state.section_repo.update(&section).await?;
        }
    }

    if let Some(requested) = requested {
        section = state.section_repo.reorder(&id, requested).await?;
    }

    ok(section)
}

/// Delete a section and its sessions; other sections keep their positions
pub async fn delete_section(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<()> {
    state.section_repo.delete(&id).await?;
    log::info!("Deleted section {}", id);
    ok(())
}
