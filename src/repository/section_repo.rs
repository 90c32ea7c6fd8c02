//! Section Repository
//!
//! Sections are ordered within their batch with the same clamp-and-swap rule
//! used for sessions.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{DomainError, DomainResult, Section, ScopeKey};
use super::db::{not_initialized, SharedConnection};
use super::positioning::{next_position, reorder_within_scope, OrderedTable};
use super::traits::Repository;

const SECTION_COLUMNS: &str = "id, batch_id, title, position, created_at, updated_at";

pub struct SectionRepository {
    conn: SharedConnection,
}

impl SectionRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Sections of a batch in display order
    pub async fn list_by_batch(&self, batch_id: &str) -> DomainResult<Vec<Section>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sections WHERE batch_id = ? ORDER BY position, id",
            SECTION_COLUMNS
        ))?;
        let sections = stmt
            .query_map(params![batch_id], row_to_section)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sections)
    }

    /// Move a section to `requested` within its batch
    pub async fn reorder(&self, id: &str, requested: i64) -> DomainResult<Section> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;

        let tx = conn.transaction()?;
        let section = find_section(&tx, id)?
            .ok_or_else(|| DomainError::NotFound(format!("Section {} not found", id)))?;
        reorder_within_scope(&tx, OrderedTable::Sections, &section.as_ordered(), requested)?;
        tx.commit()?;

        find_section(conn, id)?
            .ok_or_else(|| DomainError::NotFound(format!("Section {} not found", id)))
    }
}

pub(crate) fn find_section(conn: &Connection, id: &str) -> DomainResult<Option<Section>> {
    let section = conn
        .query_row(
            &format!("SELECT {} FROM sections WHERE id = ?", SECTION_COLUMNS),
            params![id],
            row_to_section,
        )
        .optional()?;
    Ok(section)
}

#[async_trait]
impl Repository<Section> for SectionRepository {
    /// Inserts at the end of the batch; `entity.order` is ignored
    async fn create(&self, entity: &Section) -> DomainResult<Section> {
        if entity.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Section title is required".into()));
        }

        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;
        let tx = conn.transaction()?;

        if super::batch_repo::find_batch(&tx, &entity.batch_id)?.is_none() {
            return Err(DomainError::NotFound(format!("Batch {} not found", entity.batch_id)));
        }

        let mut created = entity.clone();
        created.order = next_position(&tx, OrderedTable::Sections, &ScopeKey::Batch(entity.batch_id.clone()))?;

        tx.execute(
            "INSERT INTO sections (id, batch_id, title, position, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                created.id,
                created.batch_id,
                created.title,
                created.order,
                created.created_at,
                created.updated_at
            ],
        )?;
        tx.commit()?;

        Ok(created)
    }

    async fn find_by_id(&self, id: &String) -> DomainResult<Option<Section>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        find_section(conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Section>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sections ORDER BY batch_id, position, id",
            SECTION_COLUMNS
        ))?;
        let sections = stmt
            .query_map([], row_to_section)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sections)
    }

    /// Updates the title only; use `reorder` to change position
    async fn update(&self, entity: &Section) -> DomainResult<Section> {
        if entity.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Section title is required".into()));
        }

        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute(
            "UPDATE sections SET title = ?, updated_at = ? WHERE id = ?",
            params![entity.title, crate::domain::now_millis(), entity.id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Section {} not found", entity.id)));
        }

        find_section(conn, &entity.id)?
            .ok_or_else(|| DomainError::NotFound(format!("Section {} not found", entity.id)))
    }

    /// Deletes the section and its sessions; sibling positions keep their gaps
    async fn delete(&self, id: &String) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute("DELETE FROM sections WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Section {} not found", id)));
        }
        Ok(())
    }
}

fn row_to_section(row: &Row<'_>) -> rusqlite::Result<Section> {
    Ok(Section {
        id: row.get(0)?,
        batch_id: row.get(1)?,
        title: row.get(2)?,
        order: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
