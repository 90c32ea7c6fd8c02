//! Session Entity
//!
//! A single class meeting. Ordered within its section, or within the batch
//! when it has no section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use super::entity::{now_millis, new_id, DomainError, DomainResult, Entity};
use super::ordering::{OrderedItem, ScopeKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub batch_id: String,
    /// Section this session belongs to (None = batch level)
    pub section_id: Option<String>,
    pub title: String,
    pub starts_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    /// Position within its scope, 1-based
    pub order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Session {
    pub fn new(batch_id: String, section_id: Option<String>, title: String, order: i64) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            batch_id,
            section_id,
            title,
            starts_at: None,
            duration_minutes: None,
            order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Session title is required".into()));
        }
        if matches!(self.duration_minutes, Some(d) if d <= 0) {
            return Err(DomainError::InvalidInput("Duration must be positive".into()));
        }
        Ok(())
    }

    pub fn scope(&self) -> ScopeKey {
        ScopeKey::for_session(&self.batch_id, self.section_id.as_deref())
    }

    pub fn as_ordered(&self) -> OrderedItem {
        OrderedItem::new(self.id.clone(), self.scope(), self.order)
    }
}

impl Entity for Session {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_falls_back_to_batch() {
        let session = Session::new("b1".to_string(), None, "Intro".to_string(), 1);
        assert_eq!(session.scope(), ScopeKey::Batch("b1".to_string()));

        let session = Session::new("b1".to_string(), Some("s1".to_string()), "Intro".to_string(), 1);
        assert_eq!(session.scope(), ScopeKey::Section("s1".to_string()));
        assert_eq!(session.as_ordered().order, 1);
    }

    #[test]
    fn test_validate() {
        let mut session = Session::new("b1".to_string(), None, "Intro".to_string(), 1);
        assert!(session.validate().is_ok());
        session.duration_minutes = Some(0);
        assert!(session.validate().is_err());
        session.duration_minutes = Some(45);
        session.title = " ".to_string();
        assert!(session.validate().is_err());
    }
}
