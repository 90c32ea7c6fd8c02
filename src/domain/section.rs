//! Section Entity

use serde::{Deserialize, Serialize};
use super::entity::{now_millis, new_id, Entity};
use super::ordering::{OrderedItem, ScopeKey};

/// A named group of sessions, ordered within its batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub batch_id: String,
    pub title: String,
    pub order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Section {
    pub fn new(batch_id: String, title: String, order: i64) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            batch_id,
            title,
            order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn scope(&self) -> ScopeKey {
        ScopeKey::Batch(self.batch_id.clone())
    }

    pub fn as_ordered(&self) -> OrderedItem {
        OrderedItem::new(self.id.clone(), self.scope(), self.order)
    }
}

impl Entity for Section {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}
