//! Enrollment Entity
//!
//! A student's seat in a batch, plus per-session progress.

use serde::{Deserialize, Serialize};
use super::entity::{now_millis, new_id, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    #[default]
    Active,
    Cancelled,
    Completed,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Cancelled => "cancelled",
            EnrollmentStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "cancelled" => EnrollmentStatus::Cancelled,
            "completed" => EnrollmentStatus::Completed,
            _ => EnrollmentStatus::Active,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    pub batch_id: String,
    pub student_id: String,
    pub status: EnrollmentStatus,
    pub enrolled_at: i64,
}

impl Enrollment {
    pub fn new(batch_id: String, student_id: String) -> Self {
        Self {
            id: new_id(),
            batch_id,
            student_id,
            status: EnrollmentStatus::Active,
            enrolled_at: now_millis(),
        }
    }
}

impl Entity for Enrollment {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

/// Completed-session counts for one enrollment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub enrollment_id: String,
    pub completed_sessions: i64,
    pub total_sessions: i64,
    pub percent: i64,
}

impl ProgressSummary {
    pub fn new(enrollment_id: String, completed_sessions: i64, total_sessions: i64) -> Self {
        let percent = if total_sessions > 0 {
            completed_sessions * 100 / total_sessions
        } else {
            0
        };
        Self {
            enrollment_id,
            completed_sessions,
            total_sessions,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(EnrollmentStatus::from_str("cancelled"), EnrollmentStatus::Cancelled);
        assert_eq!(EnrollmentStatus::from_str("bogus"), EnrollmentStatus::Active);
        assert_eq!(EnrollmentStatus::Completed.as_str(), "completed");
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(ProgressSummary::new("e".into(), 1, 3).percent, 33);
        assert_eq!(ProgressSummary::new("e".into(), 0, 0).percent, 0);
        assert_eq!(ProgressSummary::new("e".into(), 4, 4).percent, 100);
    }
}
