//! Scope Positioning
//!
//! Shared position queries for tables whose rows are ordered within a scope
//! (sections within a batch, sessions within a section or batch). Callers hold
//! the connection lock and, for writes, an open transaction.

use rusqlite::{params, Connection};

use crate::domain::ordering::{next_order, resolve_reorder};
use crate::domain::{DomainError, DomainResult, OrderWrite, OrderedItem, ReorderPlan, ScopeKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OrderedTable {
    Sections,
    Sessions,
}

impl OrderedTable {
    fn name(&self) -> &'static str {
        match self {
            OrderedTable::Sections => "sections",
            OrderedTable::Sessions => "sessions",
        }
    }

    /// WHERE clause selecting the rows of `scope`, bound to one parameter
    fn scope_filter(&self, scope: &ScopeKey) -> DomainResult<&'static str> {
        match (self, scope) {
            (OrderedTable::Sections, ScopeKey::Batch(_)) => Ok("batch_id = ?"),
            (OrderedTable::Sessions, ScopeKey::Section(_)) => Ok("section_id = ?"),
            (OrderedTable::Sessions, ScopeKey::Batch(_)) => Ok("batch_id = ? AND section_id IS NULL"),
            (OrderedTable::Sections, ScopeKey::Section(_)) => Err(DomainError::ScopeMismatch(
                "sections are ordered within a batch".to_string(),
            )),
        }
    }
}

/// All rows of a scope sorted by (position, id)
pub(crate) fn load_scope(
    conn: &Connection,
    table: OrderedTable,
    scope: &ScopeKey,
) -> DomainResult<Vec<OrderedItem>> {
    let filter = table.scope_filter(scope)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT id, position FROM {} WHERE {} ORDER BY position, id",
        table.name(),
        filter
    ))?;
    let items = stmt
        .query_map(params![scope.id()], |row| {
            Ok(OrderedItem::new(
                row.get::<_, String>(0)?,
                scope.clone(),
                row.get::<_, i64>(1)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

/// Position for a row appended to `scope`
pub(crate) fn next_position(
    conn: &Connection,
    table: OrderedTable,
    scope: &ScopeKey,
) -> DomainResult<i64> {
    let filter = table.scope_filter(scope)?;
    let max: Option<i64> = conn.query_row(
        &format!("SELECT MAX(position) FROM {} WHERE {}", table.name(), filter),
        params![scope.id()],
        |row| row.get(0),
    )?;
    Ok(next_order(max))
}

/// Apply a write-set; every write must hit exactly one row.
/// Run inside a transaction so a failed write rolls back the others.
pub(crate) fn apply_writes(
    conn: &Connection,
    table: OrderedTable,
    writes: &[OrderWrite],
) -> DomainResult<()> {
    let now = crate::domain::now_millis();
    let sql = format!(
        "UPDATE {} SET position = ?, updated_at = ? WHERE id = ?",
        table.name()
    );
    for write in writes {
        let changed = conn.execute(&sql, params![write.order, now, write.id])?;
        if changed != 1 {
            return Err(DomainError::NotFound(format!(
                "{} row {} disappeared during reorder",
                table.name(),
                write.id
            )));
        }
    }
    Ok(())
}

/// Load the mover's scope, resolve the request and apply the writes
pub(crate) fn reorder_within_scope(
    conn: &Connection,
    table: OrderedTable,
    mover: &OrderedItem,
    requested: i64,
) -> DomainResult<ReorderPlan> {
    let scope_items = load_scope(conn, table, &mover.scope)?;
    let plan = resolve_reorder(mover, requested, &scope_items)?;

    if plan.is_noop() {
        log::debug!("Reorder of {} in {} is a no-op", mover.id, mover.scope);
        return Ok(plan);
    }

    apply_writes(conn, table, &plan.writes)?;
    log::info!(
        "Reordered {} {} in {}: {} -> {} ({} write(s))",
        table.name(),
        mover.id,
        mover.scope,
        mover.order,
        plan.target,
        plan.writes.len()
    );
    Ok(plan)
}
