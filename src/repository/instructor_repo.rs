//! Instructor Repository
//!
//! Instructor CRUD and course assignments.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{DomainError, DomainResult, Instructor};
use super::db::{not_initialized, SharedConnection};
use super::traits::Repository;

const INSTRUCTOR_COLUMNS: &str = "id, name, email, bio, created_at, updated_at";

pub struct InstructorRepository {
    conn: SharedConnection,
}

impl InstructorRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Assign an instructor to a course; assigning twice is a conflict
    pub async fn assign_to_course(&self, course_id: &str, instructor_id: &str) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        if super::course_repo::find_course(conn, course_id)?.is_none() {
            return Err(DomainError::NotFound(format!("Course {} not found", course_id)));
        }
        if find_instructor(conn, instructor_id)?.is_none() {
            return Err(DomainError::NotFound(format!("Instructor {} not found", instructor_id)));
        }

        conn.execute(
            "INSERT INTO course_instructors (course_id, instructor_id, assigned_at) VALUES (?, ?, ?)",
            params![course_id, instructor_id, crate::domain::now_millis()],
        )
        .map_err(|e| match DomainError::from(e) {
            DomainError::Conflict(_) => DomainError::Conflict(format!(
                "Instructor {} is already assigned to course {}",
                instructor_id, course_id
            )),
            other => other,
        })?;

        log::info!("Assigned instructor {} to course {}", instructor_id, course_id);
        Ok(())
    }

    pub async fn unassign_from_course(&self, course_id: &str, instructor_id: &str) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute(
            "DELETE FROM course_instructors WHERE course_id = ? AND instructor_id = ?",
            params![course_id, instructor_id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!(
                "Instructor {} is not assigned to course {}",
                instructor_id, course_id
            )));
        }
        Ok(())
    }

    /// Instructors of a course in assignment order
    pub async fn list_by_course(&self, course_id: &str) -> DomainResult<Vec<Instructor>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        if super::course_repo::find_course(conn, course_id)?.is_none() {
            return Err(DomainError::NotFound(format!("Course {} not found", course_id)));
        }

        let mut stmt = conn.prepare(
            "SELECT i.id, i.name, i.email, i.bio, i.created_at, i.updated_at
             FROM instructors i JOIN course_instructors ci ON ci.instructor_id = i.id
             WHERE ci.course_id = ?
             ORDER BY ci.assigned_at, i.id",
        )?;
        let instructors = stmt
            .query_map(params![course_id], row_to_instructor)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(instructors)
    }
}

pub(crate) fn find_instructor(conn: &Connection, id: &str) -> DomainResult<Option<Instructor>> {
    let instructor = conn
        .query_row(
            &format!("SELECT {} FROM instructors WHERE id = ?", INSTRUCTOR_COLUMNS),
            params![id],
            row_to_instructor,
        )
        .optional()?;
    Ok(instructor)
}

fn email_conflict(email: &str) -> impl FnOnce(rusqlite::Error) -> DomainError + '_ {
    move |e| match DomainError::from(e) {
        DomainError::Conflict(_) => {
            DomainError::Conflict(format!("An instructor with email {} already exists", email))
        }
        other => other,
    }
}

#[async_trait]
impl Repository<Instructor> for InstructorRepository {
    async fn create(&self, entity: &Instructor) -> DomainResult<Instructor> {
        entity.validate()?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        conn.execute(
            "INSERT INTO instructors (id, name, email, bio, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
            params![
                entity.id,
                entity.name,
                entity.email,
                entity.bio,
                entity.created_at,
                entity.updated_at
            ],
        )
        .map_err(email_conflict(&entity.email))?;

        Ok(entity.clone())
    }

    async fn find_by_id(&self, id: &String) -> DomainResult<Option<Instructor>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        find_instructor(conn, id)
    }

    async fn list(&self) -> DomainResult<Vec<Instructor>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM instructors ORDER BY name, id",
            INSTRUCTOR_COLUMNS
        ))?;
        let instructors = stmt
            .query_map([], row_to_instructor)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(instructors)
    }

    async fn update(&self, entity: &Instructor) -> DomainResult<Instructor> {
        entity.validate()?;
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut updated = entity.clone();
        updated.updated_at = crate::domain::now_millis();

        let changed = conn
            .execute(
                "UPDATE instructors SET name = ?, email = ?, bio = ?, updated_at = ? WHERE id = ?",
                params![updated.name, updated.email, updated.bio, updated.updated_at, updated.id],
            )
            .map_err(email_conflict(&entity.email))?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Instructor {} not found", entity.id)));
        }

        Ok(updated)
    }

    /// Course assignments go with the instructor; authored posts keep no author
    async fn delete(&self, id: &String) -> DomainResult<()> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute("DELETE FROM instructors WHERE id = ?", params![id])?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Instructor {} not found", id)));
        }
        Ok(())
    }
}

fn row_to_instructor(row: &Row<'_>) -> rusqlite::Result<Instructor> {
    Ok(Instructor {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        bio: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
