//! Ordering Resolver
//!
//! Sessions and sections carry a 1-based `order` relative to a parent scope.
//! A reorder request is resolved into a minimal write-set: the mover takes the
//! requested slot and, if another item already holds it, that item takes the
//! mover's previous value. No other sibling is touched and gaps are kept.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::entity::{DomainError, DomainResult};

/// The parent an item's order is relative to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ScopeKey {
    Section(String),
    Batch(String),
}

impl ScopeKey {
    /// Sessions are scoped by their section, or by the batch when unsectioned
    pub fn for_session(batch_id: &str, section_id: Option<&str>) -> Self {
        match section_id {
            Some(sid) => ScopeKey::Section(sid.to_string()),
            None => ScopeKey::Batch(batch_id.to_string()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ScopeKey::Section(id) | ScopeKey::Batch(id) => id,
        }
    }
}

impl std::fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeKey::Section(id) => write!(f, "section {}", id),
            ScopeKey::Batch(id) => write!(f, "batch {}", id),
        }
    }
}

/// Position-bearing view of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub id: String,
    pub scope: ScopeKey,
    pub order: i64,
}

impl OrderedItem {
    pub fn new(id: impl Into<String>, scope: ScopeKey, order: i64) -> Self {
        Self {
            id: id.into(),
            scope,
            order,
        }
    }
}

/// A single `order` assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderWrite {
    pub id: String,
    pub order: i64,
}

/// Result of resolving one reorder request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderPlan {
    /// Requested order after clamping
    pub target: i64,
    /// Writes to apply atomically; empty for a no-op
    pub writes: Vec<OrderWrite>,
}

impl ReorderPlan {
    pub fn is_noop(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Order for an item appended to a scope holding `existing` orders
pub fn next_order<I: IntoIterator<Item = i64>>(existing: I) -> i64 {
    existing.into_iter().max().unwrap_or(0).max(0) + 1
}

/// Parse a requested order from a JSON value.
///
/// Integers and numeric strings are accepted; integral floats are accepted
/// as their integer value. Out-of-range values are left for the clamp.
pub fn parse_requested_order(value: &serde_json::Value) -> DomainResult<i64> {
    use serde_json::Value;

    let invalid = || DomainError::InvalidOrder(format!("expected an integer, got {}", value));
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i),
            // floats, and u64 above i64::MAX
            None => n.as_f64().and_then(float_to_order).ok_or_else(invalid),
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(i);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(float_to_order)
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn float_to_order(f: f64) -> Option<i64> {
    if !f.is_finite() || f.fract() != 0.0 {
        return None;
    }
    Some(f.clamp(i64::MIN as f64, i64::MAX as f64) as i64)
}

/// Resolve a move of `item` to `requested` within its own scope.
///
/// `scope_items` must all share `item.scope`; the mover may or may not be
/// present in it. Scope changes are handled by the caller before this runs.
///
/// On a clean scope the plan is a swap with the occupant or a single
/// hole-fill write. When the scope already holds duplicate orders, the items
/// left sharing a value are moved to fresh slots past the current maximum.
pub fn resolve_reorder(
    item: &OrderedItem,
    requested: i64,
    scope_items: &[OrderedItem],
) -> DomainResult<ReorderPlan> {
    if let Some(stray) = scope_items.iter().find(|other| other.scope != item.scope) {
        return Err(DomainError::ScopeMismatch(format!(
            "item {} belongs to {}, expected {}",
            stray.id, stray.scope, item.scope
        )));
    }

    let mut placed: Vec<OrderedItem> = scope_items
        .iter()
        .filter(|other| other.id != item.id)
        .cloned()
        .collect();
    let count = placed.len() as i64 + 1;
    let target = requested.clamp(1, count);

    if target == item.order {
        return Ok(ReorderPlan {
            target,
            writes: Vec::new(),
        });
    }

    let original: Vec<i64> = placed.iter().map(|other| other.order).collect();
    let mut touched = vec![false; placed.len() + 1];

    let occupant = placed
        .iter()
        .enumerate()
        .filter(|(_, other)| other.order == target)
        .min_by(|(_, a), (_, b)| a.id.cmp(&b.id))
        .map(|(idx, _)| idx);
    if let Some(idx) = occupant {
        placed[idx].order = item.order;
        touched[idx] = true;
    }

    let mover = placed.len();
    placed.push(OrderedItem::new(item.id.clone(), item.scope.clone(), target));
    touched[mover] = true;

    separate_duplicates(&mut placed, &touched, mover);

    let mut writes: Vec<OrderWrite> = placed[..mover]
        .iter()
        .zip(&original)
        .filter(|(other, before)| other.order != **before)
        .map(|(other, _)| OrderWrite {
            id: other.id.clone(),
            order: other.order,
        })
        .collect();
    writes.push(OrderWrite {
        id: item.id.clone(),
        order: placed[mover].order,
    });

    Ok(ReorderPlan { target, writes })
}

/// Give every order value a single holder. At each shared value the mover
/// stays, then an untouched item (lowest id); the rest go past the maximum.
fn separate_duplicates(items: &mut [OrderedItem], touched: &[bool], mover: usize) {
    let mut holders: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, item) in items.iter().enumerate() {
        holders.entry(item.order).or_default().push(idx);
    }

    let mut next_free = holders.keys().next_back().copied().unwrap_or(0) + 1;
    for (_, mut shared) in holders {
        if shared.len() < 2 {
            continue;
        }
        shared.sort_by(|&a, &b| {
            (a != mover)
                .cmp(&(b != mover))
                .then(touched[a].cmp(&touched[b]))
                .then_with(|| items[a].id.cmp(&items[b].id))
        });
        for &idx in &shared[1..] {
            items[idx].order = next_free;
            next_free += 1;
        }
    }
}
