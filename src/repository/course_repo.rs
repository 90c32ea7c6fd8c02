//! Course Repository
//!
//! SQLite-backed implementation of Repository<Course>.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Course, DomainError, DomainResult};
use super::db::{not_initialized, SharedConnection};
use super::traits::{Repository, SearchableRepository};

const COURSE_COLUMNS: &str =
    "id, title, description, price_cents, discount_percent, published, created_at, updated_at";

pub struct CourseRepository {
    conn: SharedConnection,
}

impl CourseRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Published courses only, newest first
    pub async fn list_published(&self) -> DomainResult<Vec<Course>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM courses WHERE published = 1 ORDER BY created_at DESC, id",
            COURSE_COLUMNS
        ))?;
        let courses = stmt
            .query_map([], row_to_course)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }
}

pub(crate) fn find_course(conn: &Connection, id: &str) -> DomainResult<Option<Course>> {
    let course = conn
        .query_row(
            &format!("SELECT {} FROM courses WHERE id = ?", COURSE_COLUMNS),
            params![id],
            row_to_course,
        )
        .optional()?;
    Ok(course)
}

#[async_trait]
impl Repository<Course> for CourseRepository {
    async fn create(&self, entity: &Course) -> DomainResult<Course> {
        entity.validate()?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        conn.execute(
            "INSERT INTO courses (id, title, description, price_cents, discount_percent, published, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entity.id,
                entity.title,
                entity.description,
                entity.price_cents,
                entity.discount_percent,
                entity.published,
                entity.created_at,
                entity.updated_at
            ],
        )?;

        Ok(entity.clone())
    }

    async fn find_by_id(&self, id: &String) -> DomainResult<Option<Course>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        find_course(conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Course>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM courses ORDER BY created_at DESC, id",
            COURSE_COLUMNS
        ))?;
        let courses = stmt
            .query_map([], row_to_course)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }

    async fn update(&self, entity: &Course) -> DomainResult<Course> {
        entity.validate()?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut updated = entity.clone();
        updated.updated_at = crate::domain::now_millis();

        let changed = conn.execute(
            "UPDATE courses SET title = ?, description = ?, price_cents = ?, discount_percent = ?, published = ?, updated_at = ?
             WHERE id = ?",
            params![
                updated.title,
                updated.description,
                updated.price_cents,
                updated.discount_percent,
                updated.published,
                updated.updated_at,
                updated.id
            ],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Course {} not found", entity.id)));
        }

        Ok(updated)
    }

    async fn delete(&self, id: &String) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        // Batches, sections, sessions and enrollments cascade
        let changed = conn.execute("DELETE FROM courses WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Course {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchableRepository<Course> for CourseRepository {
    async fn search(&self, query: &str) -> DomainResult<Vec<Course>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let pattern = format!("%{}%", query.trim());
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM courses WHERE title LIKE ?1 OR description LIKE ?1 ORDER BY title, id",
            COURSE_COLUMNS
        ))?;
        let courses = stmt
            .query_map(params![pattern], row_to_course)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(courses)
    }
}

/// Convert a database row to Course
fn row_to_course(row: &Row<'_>) -> rusqlite::Result<Course> {
    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        price_cents: row.get(3)?,
        discount_percent: row.get(4)?,
        published: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
