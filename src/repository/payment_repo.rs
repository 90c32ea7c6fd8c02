//! Payment Repository
//!
//! Stub payments for enrollments. The amount is taken from the course's
//! discounted price when the payment is opened.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{DomainError, DomainResult, EnrollmentStatus, Payment, PaymentStatus};
use super::db::{not_initialized, SharedConnection};

const PAYMENT_COLUMNS: &str = "id, enrollment_id, amount_cents, status, reference, created_at, updated_at";

pub struct PaymentRepository {
    conn: SharedConnection,
}

impl PaymentRepository {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    /// Open a pending payment for an active enrollment. Only one pending or
    /// paid payment may exist per enrollment.
    pub async fn open_for_enrollment(&self, enrollment_id: &str) -> DomainResult<Payment> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;
        let tx = conn.transaction()?;

        let (batch_id, status): (String, String) = tx
            .query_row(
                "SELECT batch_id, status FROM enrollments WHERE id = ?",
                params![enrollment_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or_else(|| DomainError::NotFound(format!("Enrollment {} not found", enrollment_id)))?;
        if EnrollmentStatus::from_str(&status) == EnrollmentStatus::Cancelled {
            return Err(DomainError::InvalidInput(format!(
                "Enrollment {} is cancelled",
                enrollment_id
            )));
        }

        let open = list_for_enrollment(&tx, enrollment_id)?
            .into_iter()
            .find(|p| p.status.is_open());
        if let Some(open) = open {
            return Err(DomainError::Conflict(format!(
                "Enrollment {} already has a {} payment ({})",
                enrollment_id,
                open.status.as_str(),
                open.id
            )));
        }

        let batch = super::batch_repo::find_batch(&tx, &batch_id)?
            .ok_or_else(|| DomainError::NotFound(format!("Batch {} not found", batch_id)))?;
        let course = super::course_repo::find_course(&tx, &batch.course_id)?
            .ok_or_else(|| DomainError::NotFound(format!("Course {} not found", batch.course_id)))?;

        let payment = Payment::new(enrollment_id.to_string(), course.effective_price_cents());
        tx.execute(
            "INSERT INTO payments (id, enrollment_id, amount_cents, status, reference, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                payment.id,
                payment.enrollment_id,
                payment.amount_cents,
                payment.status.as_str(),
                payment.reference,
                payment.created_at,
                payment.updated_at
            ],
        )?;
        tx.commit()?;

        log::info!(
            "Opened payment {} for enrollment {}: {} cents",
            payment.id,
            enrollment_id,
            payment.amount_cents
        );
        Ok(payment)
    }

    pub async fn find_by_id(&self, id: &str) -> DomainResult<Option<Payment>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        find_payment(conn, id)
    }

    pub async fn list_by_enrollment(&self, enrollment_id: &str) -> DomainResult<Vec<Payment>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;
        list_for_enrollment(conn, enrollment_id)
    }

    /// Advance a payment along its lifecycle
    pub async fn set_status(&self, id: &str, status: PaymentStatus) -> DomainResult<Payment> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut payment = find_payment(conn, id)?
            .ok_or_else(|| DomainError::NotFound(format!("Payment {} not found", id)))?;
        payment.transition(status)?;

        conn.execute(
            "UPDATE payments SET status = ?, reference = ?, updated_at = ? WHERE id = ?",
            params![payment.status.as_str(), payment.reference, payment.updated_at, payment.id],
        )?;

        log::info!("Payment {} is now {}", id, payment.status.as_str());
        Ok(payment)
    }
}

fn find_payment(conn: &Connection, id: &str) -> DomainResult<Option<Payment>> {
    let payment = conn
        .query_row(
            &format!("SELECT {} FROM payments WHERE id = ?", PAYMENT_COLUMNS),
            params![id],
            row_to_payment,
        )
        .optional()?;
    Ok(payment)
}

fn list_for_enrollment(conn: &Connection, enrollment_id: &str) -> DomainResult<Vec<Payment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM payments WHERE enrollment_id = ? ORDER BY created_at, id",
        PAYMENT_COLUMNS
    ))?;
    let payments = stmt
        .query_map(params![enrollment_id], row_to_payment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(payments)
}

fn row_to_payment(row: &Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: row.get(0)?,
        enrollment_id: row.get(1)?,
        amount_cents: row.get(2)?,
        status: PaymentStatus::from_str(&row.get::<_, String>(3)?),
        reference: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}
