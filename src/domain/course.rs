//! Course Entity
//!
//! A catalog entry. Batches hang off a course.

use serde::{Deserialize, Serialize};
use super::entity::{now_millis, new_id, DomainError, DomainResult, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// List price in the smallest currency unit
    pub price_cents: i64,
    /// Percentage off the list price (0..=100)
    pub discount_percent: Option<i32>,
    pub published: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Course {
    pub fn new(title: String, price_cents: i64) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            title,
            description: None,
            price_cents,
            discount_percent: None,
            published: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Price after discount, rounded down
    pub fn effective_price_cents(&self) -> i64 {
        let discount = i128::from(self.discount_percent.unwrap_or(0).clamp(0, 100));
        // never exceeds |price_cents|, so it fits back into i64
        (i128::from(self.price_cents) * (100 - discount) / 100) as i64
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.title.trim().is_empty() {
            return Err(DomainError::InvalidInput("Course title is required".into()));
        }
        if self.price_cents < 0 {
            return Err(DomainError::InvalidInput("Price cannot be negative".into()));
        }
        if let Some(d) = self.discount_percent {
            if !(0..=100).contains(&d) {
                return Err(DomainError::InvalidInput(format!(
                    "Discount must be between 0 and 100, got {}",
                    d
                )));
            }
        }
        Ok(())
    }
}

/// Course as returned by the API, with the discounted price resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseView {
    #[serde(flatten)]
    pub course: Course,
    pub effective_price_cents: i64,
}

impl From<Course> for CourseView {
    fn from(course: Course) -> Self {
        Self {
            effective_price_cents: course.effective_price_cents(),
            course,
        }
    }
}

impl Entity for Course {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_price() {
        let mut course = Course::new("Rust".to_string(), 9999);
        assert_eq!(course.effective_price_cents(), 9999);

        course.discount_percent = Some(25);
        assert_eq!(course.effective_price_cents(), 7499);

        course.discount_percent = Some(100);
        assert_eq!(course.effective_price_cents(), 0);
    }

    #[test]
    fn test_effective_price_at_upper_bound() {
        let mut course = Course::new("Big".to_string(), i64::MAX);
        course.discount_percent = Some(1);
        assert_eq!(course.effective_price_cents(), (i64::MAX as i128 * 99 / 100) as i64);

        course.discount_percent = None;
        assert_eq!(course.effective_price_cents(), i64::MAX);
    }

    #[test]
    fn test_view_exposes_effective_price() {
        let mut course = Course::new("Rust".to_string(), 2000);
        course.discount_percent = Some(50);
        let value = serde_json::to_value(CourseView::from(course)).unwrap();
        assert_eq!(value["effective_price_cents"], 1000);
        assert_eq!(value["price_cents"], 2000);
        assert_eq!(value["title"], "Rust");
    }

    #[test]
    fn test_validate() {
        let course = Course::new("  ".to_string(), 100);
        assert!(course.validate().is_err());

        let mut course = Course::new("Go".to_string(), 100);
        assert!(course.validate().is_ok());
        course.discount_percent = Some(101);
        assert!(matches!(course.validate(), Err(DomainError::InvalidInput(_))));
    }
}
