//! Instructor Entity
//!
//! Teaching staff. Instructors are assigned to courses and may author blog
//! posts.

use serde::{Deserialize, Serialize};
use super::entity::{now_millis, new_id, DomainError, DomainResult, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    pub id: String,
    pub name: String,
    /// Unique across instructors, stored lowercased
    pub email: String,
    pub bio: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Instructor {
    pub fn new(name: String, email: String) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            name,
            email: normalize_email(&email),
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidInput("Instructor name is required".into()));
        }
        let well_formed = match self.email.split_once('@') {
            Some((user, host)) => {
                !user.is_empty()
                    && host.contains('.')
                    && !host.starts_with('.')
                    && !host.ends_with('.')
                    && !self.email.chars().any(char::is_whitespace)
            }
            None => false,
        };
        if !well_formed {
            return Err(DomainError::InvalidInput(format!(
                "Invalid instructor email: {}",
                self.email
            )));
        }
        Ok(())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Entity for Instructor {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}
