//! Enrollment Repository
//!
//! Enrollments and per-session progress.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{DomainError, DomainResult, Enrollment, EnrollmentStatus, ProgressSummary};
use super::db::{not_initialized, SharedConnection};

const ENROLLMENT_COLUMNS: &str = "id, batch_id, student_id, status, enrolled_at";

pub struct EnrollmentRepository {
    conn: SharedConnection,
}

impl EnrollmentRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Enroll a student in a batch, respecting batch capacity
    pub async fn enroll(&self, batch_id: &str, student_id: &str) -> DomainResult<Enrollment> {
        if student_id.trim().is_empty() {
            return Err(DomainError::InvalidInput("Student id is required".into()));
        }

        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;
        let tx = conn.transaction()?;

        let batch = super::batch_repo::find_batch(&tx, batch_id)?
            .ok_or_else(|| DomainError::NotFound(format!("Batch {} not found", batch_id)))?;

        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM enrollments WHERE batch_id = ? AND student_id = ?",
                params![batch_id, student_id],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(DomainError::Conflict(format!(
                "Student {} is already enrolled in batch {}",
                student_id, batch_id
            )));
        }

        let active: i64 = tx.query_row(
            "SELECT COUNT(*) FROM enrollments WHERE batch_id = ? AND status = 'active'",
            params![batch_id],
            |row| row.get(0),
        )?;
        if !batch.has_room(active) {
            return Err(DomainError::Conflict(format!("Batch {} is full", batch_id)));
        }

        let enrollment = Enrollment::new(batch_id.to_string(), student_id.to_string());
        tx.execute(
            "INSERT INTO enrollments (id, batch_id, student_id, status, enrolled_at) VALUES (?, ?, ?, ?, ?)",
            params![
                enrollment.id,
                enrollment.batch_id,
                enrollment.student_id,
                enrollment.status.as_str(),
                enrollment.enrolled_at
            ],
        )?;
        tx.commit()?;

        log::info!("Enrolled student {} in batch {}", student_id, batch_id);
        Ok(enrollment)
    }

    pub async fn find_by_id(&self, id: &str) -> DomainResult<Option<Enrollment>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        find_enrollment(conn, id)
    }

    pub async fn list_by_batch(&self, batch_id: &str) -> DomainResult<Vec<Enrollment>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM enrollments WHERE batch_id = ? ORDER BY enrolled_at, id",
            ENROLLMENT_COLUMNS
        ))?;
        let enrollments = stmt
            .query_map(params![batch_id], row_to_enrollment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(enrollments)
    }

    /// Mark an enrollment cancelled; its seat is freed, progress is kept
    pub async fn cancel(&self, id: &str) -> DomainResult<Enrollment> {
        self.set_status(id, EnrollmentStatus::Cancelled).await
    }

    pub async fn set_status(&self, id: &str, status: EnrollmentStatus) -> DomainResult<Enrollment> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let changed = conn.execute(
            "UPDATE enrollments SET status = ? WHERE id = ?",
            params![status.as_str(), id],
        )?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Enrollment {} not found", id)));
        }

        find_enrollment(conn, id)?
            .ok_or_else(|| DomainError::NotFound(format!("Enrollment {} not found", id)))
    }

    /// Record or clear completion of one session
    pub async fn set_progress(
        &self,
        enrollment_id: &str,
        session_id: &str,
        completed: bool,
    ) -> DomainResult<ProgressSummary> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let enrollment = find_enrollment(conn, enrollment_id)?
            .ok_or_else(|| DomainError::NotFound(format!("Enrollment {} not found", enrollment_id)))?;
        if enrollment.status == EnrollmentStatus::Cancelled {
            return Err(DomainError::InvalidInput(format!(
                "Enrollment {} is cancelled",
                enrollment_id
            )));
        }

        let session = super::session::find_session(conn, session_id)?
            .ok_or_else(|| DomainError::NotFound(format!("Session {} not found", session_id)))?;
        if session.batch_id != enrollment.batch_id {
            return Err(DomainError::InvalidInput(format!(
                "Session {} is not part of batch {}",
                session_id, enrollment.batch_id
            )));
        }

        if completed {
            conn.execute(
                "INSERT OR IGNORE INTO progress (enrollment_id, session_id, completed_at) VALUES (?, ?, ?)",
                params![enrollment_id, session_id, crate::domain::now_millis()],
            )?;
        } else {
            conn.execute(
                "DELETE FROM progress WHERE enrollment_id = ? AND session_id = ?",
                params![enrollment_id, session_id],
            )?;
        }

        progress_summary(conn, &enrollment)
    }

    pub async fn progress(&self, enrollment_id: &str) -> DomainResult<ProgressSummary> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let enrollment = find_enrollment(conn, enrollment_id)?
            .ok_or_else(|| DomainError::NotFound(format!("Enrollment {} not found", enrollment_id)))?;
        progress_summary(conn, &enrollment)
    }
}

fn find_enrollment(conn: &Connection, id: &str) -> DomainResult<Option<Enrollment>> {
    let enrollment = conn
        .query_row(
            &format!("SELECT {} FROM enrollments WHERE id = ?", ENROLLMENT_COLUMNS),
            params![id],
            row_to_enrollment,
        )
        .optional()?;
    Ok(enrollment)
}

fn progress_summary(conn: &Connection, enrollment: &Enrollment) -> DomainResult<ProgressSummary> {
    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sessions WHERE batch_id = ?",
        params![enrollment.batch_id],
        |row| row.get(0),
    )?;
    let completed: i64 = conn.query_row(
        "SELECT COUNT(*) FROM progress p JOIN sessions s ON s.id = p.session_id
         WHERE p.enrollment_id = ? AND s.batch_id = ?",
        params![enrollment.id, enrollment.batch_id],
        |row| row.get(0),
    )?;
    Ok(ProgressSummary::new(enrollment.id.clone(), completed, total))
}

fn row_to_enrollment(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    Ok(Enrollment {
        id: row.get(0)?,
        batch_id: row.get(1)?,
        student_id: row.get(2)?,
        status: EnrollmentStatus::from_str(&row.get::<_, String>(3)?),
        enrolled_at: row.get(4)?,
    })
}
