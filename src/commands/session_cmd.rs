//! Session Commands
//!
//! Session CRUD plus the reorder endpoint.

use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{DomainError, Session};
use crate::repository::{Repository, ScopeChange, SessionHierarchyOperations, SessionPositioningOperations};
use super::{created, double_option, ok, optional_order, ApiResult, CreatedResult, JsonBody, SharedState};

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub title: String,
    pub section_id: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSessionRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub starts_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    pub duration_minutes: Option<Option<i64>>,
    /// Absent = keep scope, null = batch level, string = that section
    #[serde(default, deserialize_with = "double_option")]
    pub section_id: Option<Option<String>>,
    #[serde(default)]
    pub order: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderSessionRequest {
    pub session_id: String,
    /// Absent = keep scope, null = batch level, string = that section
    #[serde(default, deserialize_with = "double_option")]
    pub section_id: Option<Option<String>>,
    #[serde(default)]
    pub order: Option<serde_json::Value>,
}

fn scope_change(section_id: Option<Option<String>>) -> ScopeChange {
    match section_id {
        None => ScopeChange::Keep,
        Some(None) => ScopeChange::BatchLevel,
        Some(Some(id)) => ScopeChange::Section(id),
    }
}

/// Create a session at the end of its section (or of the batch)
pub async fn create_session(
    State(state): State<SharedState>,
    Path(batch_id): Path<String>,
    JsonBody(req): JsonBody<CreateSessionRequest>,
) -> CreatedResult<Session> {
    let mut session = Session::new(batch_id, req.section_id, req.title, 0);
    session.starts_at = req.starts_at;
    session.duration_minutes = req.duration_minutes;

    created(state.session_repo.create(&session).await?)
}

pub async fn list_batch_sessions(
    State(state): State<SharedState>,
    Path(batch_id): Path<String>,
) -> ApiResult<Vec<Session>> {
    ok(state.session_repo.list_by_batch(&batch_id).await?)
}

pub async fn list_section_sessions(
    State(state): State<SharedState>,
    Path(section_id): Path<String>,
) -> ApiResult<Vec<Session>> {
    ok(state.session_repo.list_by_section(&section_id).await?)
}

pub async fn get_session(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<Session> {
    let session = state
        .session_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Session {} not found", id)))?;
    ok(session)
}

/// Move a session to a requested order, optionally into another scope
pub async fn reorder_session(
    State(state): State<SharedState>,
    JsonBody(req): JsonBody<ReorderSessionRequest>,
) -> ApiResult<Session> {
    let requested = optional_order(req.order.as_ref())?
        .ok_or_else(|| DomainError::InvalidOrder("order is required".into()))?;

    let session = state
        .session_repo
        .reorder(&req.session_id, scope_change(req.section_id), Some(requested))
        .await?;
    ok(session)
}

/// Update only the fields present in the body; scope and order changes
/// are resolved like `reorder_session` and commit with the field edit
pub async fn update_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateSessionRequest>,
) -> ApiResult<Session> {
    let requested = optional_order(req.order.as_ref())?;

    let existing = state
        .session_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Session {} not found", id)))?;

    let fields_changed = req.title.is_some() || req.starts_at.is_some() || req.duration_minutes.is_some();
    let updated = Session {
        title: req.title.unwrap_or_else(|| existing.title.clone()),
        starts_at: req.starts_at.unwrap_or(existing.starts_at),
        duration_minutes: req.duration_minutes.unwrap_or(existing.duration_minutes),
        ..existing.clone()
    };
    updated.validate()?;

    let change = scope_change(req.section_id);
    let moves = change != ScopeChange::Keep || requested.is_some();
    let session = match (moves, fields_changed) {
        (true, true) => state.session_repo.update_and_reorder(&updated, change, requested).await?,
        (true, false) => state.session_repo.reorder(&id, change, requested).await?,
        (false, true) => state.session_repo.update(&updated).await?,
        (false, false) => existing,
    };

    ok(session)
}

/// Delete a session; siblings keep their orders
pub async fn delete_session(State(state): State<SharedState>, Path(id): Path<String>) -> ApiResult<()> {
    state.session_repo.delete(&id).await?;
    log::info!("Deleted session {}", id);
    ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Json;
    use crate::commands::{create_batch, create_course, create_section, CreateBatchRequest, CreateCourseRequest, CreateSectionRequest};
    use crate::domain::{Batch, Section};
    use crate::repository::init_db;
    use crate::AppState;
    use serde_json::json;
    use std::path::Path as FsPath;
    use std::sync::Arc;

    async fn state() -> SharedState {
        let db = init_db(FsPath::new(":memory:")).await.unwrap();
        Arc::new(AppState::new(db))
    }

    async fn seed(state: &SharedState) -> (Batch, Section) {
        let (_, Json(course)) = create_course(
            State(state.clone()),
            JsonBody(CreateCourseRequest {
                title: "Rust".to_string(),
                description: None,
                price_cents: 0,
                discount_percent: None,
                published: false,
            }),
        )
        .await
        .unwrap();
        let (_, Json(batch)) = create_batch(
            State(state.clone()),
            Path(course.data.unwrap().course.id),
            JsonBody(CreateBatchRequest {
                name: "Spring".to_string(),
                starts_on: None,
                capacity: None,
            }),
        )
        .await
        .unwrap();
        let batch = batch.data.unwrap();
        let (_, Json(section)) = create_section(
            State(state.clone()),
            Path(batch.id.clone()),
            JsonBody(CreateSectionRequest {
                title: "Week 1".to_string(),
            }),
        )
        .await
        .unwrap();
        (batch, section.data.unwrap())
    }

    async fn add(state: &SharedState, batch: &Batch, section: Option<&Section>, title: &str) -> Session {
        let (_, Json(resp)) = create_session(
            State(state.clone()),
            Path(batch.id.clone()),
            JsonBody(CreateSessionRequest {
                title: title.to_string(),
                section_id: section.map(|s| s.id.clone()),
                starts_at: None,
                duration_minutes: Some(60),
            }),
        )
        .await
        .unwrap();
        resp.data.unwrap()
    }

    fn reorder_body(value: serde_json::Value) -> JsonBody<ReorderSessionRequest> {
        JsonBody(serde_json::from_value(value).unwrap())
    }

    #[tokio::test]
    async fn test_reorder_endpoint_swaps() {
        let state = state().await;
        let (batch, section) = seed(&state).await;
        let a = add(&state, &batch, Some(&section), "A").await;
        add(&state, &batch, Some(&section), "B").await;
        let c = add(&state, &batch, Some(&section), "C").await;

        let Json(resp) = reorder_session(
            State(state.clone()),
            reorder_body(json!({ "session_id": c.id, "order": 1 })),
        )
        .await
        .unwrap();
        assert!(resp.success);
        assert_eq!(resp.data.unwrap().order, 1);

        let Json(a_after) = get_session(State(state.clone()), Path(a.id.clone())).await.unwrap();
        assert_eq!(a_after.data.unwrap().order, 3);
    }

    #[tokio::test]
    async fn test_reorder_rejects_non_numeric_order() {
        let state = state().await;
        let (batch, section) = seed(&state).await;
        let a = add(&state, &batch, Some(&section), "A").await;

        for body in [
            json!({ "session_id": a.id, "order": "first" }),
            json!({ "session_id": a.id, "order": 1.5 }),
            json!({ "session_id": a.id }),
        ] {
            let err = reorder_session(State(state.clone()), reorder_body(body)).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidOrder(_)));
        }
    }

    #[tokio::test]
    async fn test_reorder_into_batch_level() {
        let state = state().await;
        let (batch, section) = seed(&state).await;
        add(&state, &batch, None, "Loose").await;
        let mover = add(&state, &batch, Some(&section), "Mover").await;

        let Json(resp) = reorder_session(
            State(state.clone()),
            reorder_body(json!({ "session_id": mover.id, "section_id": null, "order": 1 })),
        )
        .await
        .unwrap();
        let moved = resp.data.unwrap();
        assert_eq!(moved.section_id, None);
        assert_eq!(moved.order, 1);

        let Json(list) = list_batch_sessions(State(state.clone()), Path(batch.id.clone())).await.unwrap();
        let titles: Vec<String> = list.data.unwrap().into_iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Mover", "Loose"]);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_fields_without_moving() {
        let state = state().await;
        let (batch, section) = seed(&state).await;
        let a = add(&state, &batch, Some(&section), "A").await;
        let b = add(&state, &batch, Some(&section), "B").await;

        let req: UpdateSessionRequest =
            serde_json::from_value(json!({ "title": "", "order": 1 })).unwrap();
        let err = update_session(State(state.clone()), Path(b.id.clone()), JsonBody(req))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let Json(a_after) = get_session(State(state.clone()), Path(a.id.clone())).await.unwrap();
        assert_eq!(a_after.data.unwrap().order, 1);
    }

    #[tokio::test]
    async fn test_update_changes_fields_and_order() {
        let state = state().await;
        let (batch, section) = seed(&state).await;
        add(&state, &batch, Some(&section), "A").await;
        let b = add(&state, &batch, Some(&section), "B").await;

        let req: UpdateSessionRequest =
            serde_json::from_value(json!({ "title": "B prime", "duration_minutes": null, "order": "1" }))
                .unwrap();
        let Json(resp) = update_session(State(state.clone()), Path(b.id.clone()), JsonBody(req))
            .await
            .unwrap();
        let updated = resp.data.unwrap();
        assert_eq!(updated.title, "B prime");
        assert_eq!(updated.duration_minutes, None);
        assert_eq!(updated.order, 1);
    }
}
