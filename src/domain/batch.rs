//! Batch Entity
//!
//! A scheduled run of a course. Sections and sessions are ordered inside it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use super::entity::{now_millis, new_id, DomainError, DomainResult, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub id: String,
    pub course_id: String,
    pub name: String,
    pub starts_on: Option<NaiveDate>,
    /// Maximum active enrollments (None = unlimited)
    pub capacity: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Batch {
    pub fn new(course_id: String, name: String) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            course_id,
            name,
            starts_on: None,
            capacity: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("Batch name is required".into()));
        }
        if matches!(self.capacity, Some(c) if c < 1) {
            return Err(DomainError::InvalidInput("Capacity must be at least 1".into()));
        }
        Ok(())
    }

    /// Whether `active` enrollments leave room for one more
    pub fn has_room(&self, active: i64) -> bool {
        self.capacity.map(|c| active < c).unwrap_or(true)
    }
}

impl Entity for Batch {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity() {
        let mut batch = Batch::new("c1".to_string(), "Spring".to_string());
        assert!(batch.has_room(1000));

        batch.capacity = Some(2);
        assert!(batch.has_room(1));
        assert!(!batch.has_room(2));

        batch.capacity = Some(0);
        assert!(batch.validate().is_err());
    }
}
