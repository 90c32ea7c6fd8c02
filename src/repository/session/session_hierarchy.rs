//! Session Hierarchy Operations
//!
//! Listing sessions by the batch or section they belong to.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{DomainResult, Session};
use crate::repository::db::not_initialized;
use super::session_repo::{row_to_session, SESSION_COLUMNS};

/// Trait for session hierarchy operations
#[async_trait]
pub trait SessionHierarchyOperations {
    /// All sessions of a batch: batch-level sessions first, then each
    /// section's sessions in section order
    async fn list_by_batch(&self, batch_id: &str) -> DomainResult<Vec<Session>>;

    /// Sessions of one section in display order
    async fn list_by_section(&self, section_id: &str) -> DomainResult<Vec<Session>>;
}

#[async_trait]
impl SessionHierarchyOperations for super::session_repo::SessionRepository {
    async fn list_by_batch(&self, batch_id: &str) -> DomainResult<Vec<Session>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let columns = SESSION_COLUMNS
            .split(", ")
            .map(|c| format!("s.{}", c))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sessions s
             LEFT JOIN sections sec ON sec.id = s.section_id
             WHERE s.batch_id = ?
             ORDER BY s.section_id IS NOT NULL, sec.position, sec.id, s.position, s.id",
            columns
        ))?;
        let sessions = stmt
            .query_map(params![batch_id], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    async fn list_by_section(&self, section_id: &str) -> DomainResult<Vec<Session>> {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or_else(not_initialized)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM sessions WHERE section_id = ? ORDER BY position, id",
            SESSION_COLUMNS
        ))?;
        let sessions = stmt
            .query_map(params![section_id], row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }
}
