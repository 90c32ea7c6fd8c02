//! Session Positioning Operations
//!
//! Reordering a session within its scope and moving it between scopes.
//! Everything a single request changes commits in one transaction.

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::domain::{DomainError, DomainResult, ScopeKey, Session};
use crate::repository::db::not_initialized;
use crate::repository::positioning::{next_position, reorder_within_scope, OrderedTable};
use super::session_repo::{ensure_section_in_batch, find_session, write_session_fields};

/// Where a session should live after a reorder request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScopeChange {
    /// Stay in the current scope
    #[default]
    Keep,
    /// Leave any section and order within the batch
    BatchLevel,
    /// Move into this section (must belong to the same batch)
    Section(String),
}

/// Trait for session positioning operations
#[async_trait]
pub trait SessionPositioningOperations {
    /// Apply a scope change and/or a requested order, returning the refreshed session.
    ///
    /// A scope change appends the session to the destination first; the
    /// requested order is then resolved against the destination scope.
    async fn reorder(
        &self,
        id: &str,
        change: ScopeChange,
        requested: Option<i64>,
    ) -> DomainResult<Session>;

    /// Write `entity`'s descriptive fields and apply a scope change and/or
    /// requested order in one transaction
    async fn update_and_reorder(
        &self,
        entity: &Session,
        change: ScopeChange,
        requested: Option<i64>,
    ) -> DomainResult<Session>;
}

#[async_trait]
impl SessionPositioningOperations for super::session_repo::SessionRepository {
    async fn reorder(
        &self,
        id: &str,
        change: ScopeChange,
        requested: Option<i64>,
    ) -> DomainResult<Session> {
        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;
        let tx = conn.transaction()?;

        move_session(&tx, id, &change, requested)?;
        tx.commit()?;

        find_session(conn, id)?
            .ok_or_else(|| DomainError::NotFound(format!("Session {} not found", id)))
    }

    async fn update_and_reorder(
        &self,
        entity: &Session,
        change: ScopeChange,
        requested: Option<i64>,
    ) -> DomainResult<Session> {
        entity.validate()?;

        let mut guard = self.conn.lock().await;
        let conn = guard.as_mut().ok_or_else(not_initialized)?;
        let tx = conn.transaction()?;

        move_session(&tx, &entity.id, &change, requested)?;
        write_session_fields(&tx, entity)?;
        tx.commit()?;

        find_session(conn, &entity.id)?
            .ok_or_else(|| DomainError::NotFound(format!("Session {} not found", entity.id)))
    }
}

/// Apply a scope change and/or a requested order inside an open transaction
fn move_session(
    tx: &Connection,
    id: &str,
    change: &ScopeChange,
    requested: Option<i64>,
) -> DomainResult<()> {
    let mut session = find_session(tx, id)?
        .ok_or_else(|| DomainError::NotFound(format!("Session {} not found", id)))?;

    let destination = match change {
        ScopeChange::Keep => session.scope(),
        ScopeChange::BatchLevel => ScopeKey::Batch(session.batch_id.clone()),
        ScopeChange::Section(section_id) => {
            ensure_section_in_batch(tx, section_id, &session.batch_id)?;
            ScopeKey::Section(section_id.clone())
        }
    };

    if destination != session.scope() {
        let appended = next_position(tx, OrderedTable::Sessions, &destination)?;
        let section_id = match &destination {
            ScopeKey::Section(sid) => Some(sid.clone()),
            ScopeKey::Batch(_) => None,
        };
        tx.execute(
            "UPDATE sessions SET section_id = ?, position = ?, updated_at = ? WHERE id = ?",
            params![section_id, appended, crate::domain::now_millis(), id],
        )?;
        log::info!(
            "Moved session {} from {} to {} at position {}",
            id,
            session.scope(),
            destination,
            appended
        );
        session.section_id = section_id;
        session.order = appended;
    }

    if let Some(requested) = requested {
        reorder_within_scope(tx, OrderedTable::Sessions, &session.as_ordered(), requested)?;
    }
    Ok(())
}
