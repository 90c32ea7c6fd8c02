//! Session Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Session CRUD operations.
//! Specialized operations are in separate modules:
//! - session_hierarchy: Listing by batch/section
//! - session_positioning: Reordering and scope moves

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{DomainError, DomainResult, Session};
use crate::repository::db::{not_initialized, SharedConnection};
use crate::repository::positioning::{next_position, OrderedTable};
use crate::repository::traits::Repository;

pub(super) const SESSION_COLUMNS: &str =
    "id, batch_id, section_id, title, starts_at, duration_minutes, position, created_at, updated_at";

/// SQLite implementation of Session repository
pub struct SessionRepository {
    pub(super) conn: SharedConnection,
}

impl SessionRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }
}

pub(crate) fn find_session(conn: &Connection, id: &str) -> DomainResult<Option<Session>> {
    let session = conn
        .query_row(
            &format!("SELECT {} FROM sessions WHERE id = ?", SESSION_COLUMNS),
            params![id],
            row_to_session,
        )
        .optional()?;
    Ok(session)
}

/// Check that `section_id` exists and belongs to `batch_id`
pub(crate) fn ensure_section_in_batch(
    conn: &Connection,
    section_id: &str,
    batch_id: &str,
) -> DomainResult<()> {
    let section = crate::repository::section_repo::find_section(conn, section_id)?
        .ok_or_else(|| DomainError::NotFound(format!("Section {} not found", section_id)))?;
    if section.batch_id != batch_id {
        log::warn!(
            "Rejected section {} for batch {}: section belongs to batch {}",
            section_id,
            batch_id,
            section.batch_id
        );
        return Err(DomainError::ScopeMismatch(format!(
            "Section {} does not belong to batch {}",
            section_id, batch_id
        )));
    }
    Ok(())
}

/// Write title, start time and duration; scope and position are left alone
pub(crate) fn write_session_fields(conn: &Connection, entity: &Session) -> DomainResult<()> {
    let changed = conn.execute(
        "UPDATE sessions SET title = ?, starts_at = ?, duration_minutes = ?, updated_at = ? WHERE id = ?",
        params![
            entity.title,
            entity.starts_at,
            entity.duration_minutes,
            crate::domain::now_millis(),
            entity.id
        ],
    )?;
    if changed == 0 {
        return Err(DomainError::NotFound(format!("Session {} not found", entity.id)));
    }
    Ok(())
}

#[async_trait]
impl Repository<Session> for SessionRepository {
    /// Inserts at the end of the session's scope; `entity.order` is ignored
    async fn create(&self, entity: &Session) -> DomainResult<Session> {
        entity.validate()?;

        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;
        let tx = conn.transaction()?;

        if crate::repository::batch_repo::find_batch(&tx, &entity.batch_id)?.is_none() {
            return Err(DomainError::NotFound(format!("Batch {} not found", entity.batch_id)));
        }
        if let Some(section_id) = &entity.section_id {
            ensure_section_in_batch(&tx, section_id, &entity.batch_id)?;
        }

        let mut created = entity.clone();
        created.order = next_position(&tx, OrderedTable::Sessions, &entity.scope())?;

        tx.execute(
            "INSERT INTO sessions (id, batch_id, section_id, title, starts_at, duration_minutes, position, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                created.id,
                created.batch_id,
                created.section_id,
                created.title,
                created.starts_at,
                created.duration_minutes,
                created.order,
                created.created_at,
                created.updated_at
            ],
        )?;
        tx.commit()?;

        Ok(created)
    }

    async fn find_by_id(&self, id: &String) -> DomainResult<Option<Session>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        find_session(conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Session>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sessions ORDER BY batch_id, section_id NULLS FIRST, position, id",
            SESSION_COLUMNS
        ))?;
        let sessions = stmt
            .query_map([], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    /// Updates descriptive fields only; scope and position go through
    /// `SessionPositioningOperations`
    async fn update(&self, entity: &Session) -> DomainResult<Session> {
        entity.validate()?;

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        write_session_fields(conn, entity)?;

        find_session(conn, &entity.id)?
            .ok_or_else(|| DomainError::NotFound(format!("Session {} not found", entity.id)))
    }

    /// Siblings are not renumbered; the gap stays
    async fn delete(&self, id: &String) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute("DELETE FROM sessions WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Session {} not found", id)));
        }
        Ok(())
    }
}

/// Convert a database row to Session
pub(super) fn row_to_session(row: &Row<'_>) -> rusqlite::Result<Session> {
    Ok(Session {
        id: row.get(0)?,
        batch_id: row.get(1)?,
        section_id: row.get(2)?,
        title: row.get(3)?,
        starts_at: row.get(4)?,
        duration_minutes: row.get(5)?,
        order: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
