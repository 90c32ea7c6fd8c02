//! Batch Repository

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Batch, DomainError, DomainResult};
use super::db::{not_initialized, SharedConnection};
use super::traits::Repository;

const BATCH_COLUMNS: &str = "id, course_id, name, starts_on, capacity, created_at, updated_at";

pub struct BatchRepository {
    conn: SharedConnection,
}

impl BatchRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Batches of a course, earliest start first (unscheduled last)
    pub async fn list_by_course(&self, course_id: &str) -> DomainResult<Vec<Batch>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM batches WHERE course_id = ?
             ORDER BY starts_on IS NULL, starts_on, created_at, id",
            BATCH_COLUMNS
        ))?;
        let batches = stmt
            .query_map(params![course_id], row_to_batch)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }
}

pub(crate) fn find_batch(conn: &Connection, id: &str) -> DomainResult<Option<Batch>> {
    let batch = conn
        .query_row(
            &format!("SELECT {} FROM batches WHERE id = ?", BATCH_COLUMNS),
            params![id],
            row_to_batch,
        )
        .optional()?;
    Ok(batch)
}

#[async_trait]
impl Repository<Batch> for BatchRepository {
    async fn create(&self, entity: &Batch) -> DomainResult<Batch> {
        entity.validate()?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        if super::course_repo::find_course(conn, &entity.course_id)?.is_none() {
            return Err(DomainError::NotFound(format!("Course {} not found", entity.course_id)));
        }

        conn.execute(
            "INSERT INTO batches (id, course_id, name, starts_on, capacity, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                entity.id,
                entity.course_id,
                entity.name,
                entity.starts_on,
                entity.capacity,
                entity.created_at,
                entity.updated_at
            ],
        )?;

        Ok(entity.clone())
    }

    async fn find_by_id(&self, id: &String) -> DomainResult<Option<Batch>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        find_batch(conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Batch>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM batches ORDER BY course_id, starts_on IS NULL, starts_on, id",
            BATCH_COLUMNS
        ))?;
        let batches = stmt
            .query_map([], row_to_batch)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(batches)
    }

    async fn update(&self, entity: &Batch) -> DomainResult<Batch> {
        entity.validate()?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut updated = entity.clone();
        updated.updated_at = crate::domain::now_millis();

        let changed = conn.execute(
            "UPDATE batches SET name = ?, starts_on = ?, capacity = ?, updated_at = ? WHERE id = ?",
            params![
                updated.name,
                updated.starts_on,
                updated.capacity,
                updated.updated_at,
                updated.id
            ],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Batch {} not found", entity.id)));
        }
        Ok(updated)
    }

    async fn delete(&self, id: &String) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute("DELETE FROM batches WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Batch {} not found", id)));
        }
        Ok(())
    }
}

fn row_to_batch(row: &Row<'_>) -> rusqlite::Result<Batch> {
    Ok(Batch {
        id: row.get(0)?,
        course_id: row.get(1)?,
        name: row.get(2)?,
        starts_on: row.get(3)?,
        capacity: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
