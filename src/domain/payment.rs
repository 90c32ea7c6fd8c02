//! Payment Entity
//!
//! A stub payment record for an enrollment. No provider is contacted; the
//! status is moved along by API calls and a local reference is issued when
//! a payment is marked paid.

use serde::{Deserialize, Serialize};
use super::entity::{now_millis, new_id, DomainError, DomainResult, Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "paid" => PaymentStatus::Paid,
            "failed" => PaymentStatus::Failed,
            "refunded" => PaymentStatus::Refunded,
            _ => PaymentStatus::Pending,
        }
    }

    /// pending -> paid | failed, paid -> refunded
    pub fn can_become(&self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Failed)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }

    /// Pending and paid payments block a second payment for the same enrollment
    pub fn is_open(&self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Paid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub enrollment_id: String,
    /// Course price after discount at the time the payment was opened
    pub amount_cents: i64,
    pub status: PaymentStatus,
    /// Local receipt reference, issued when paid
    pub reference: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Payment {
    pub fn new(enrollment_id: String, amount_cents: i64) -> Self {
        let now = now_millis();
        Self {
            id: new_id(),
            enrollment_id,
            amount_cents,
            status: PaymentStatus::Pending,
            reference: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    pub fn transition(&mut self, next: PaymentStatus) -> DomainResult<()> {
        if !self.status.can_become(next) {
            return Err(DomainError::InvalidInput(format!(
                "Payment {} cannot go from {} to {}",
                self.id,
                self.status.as_str(),
                next.as_str()
            )));
        }
        if next == PaymentStatus::Paid {
            self.reference = Some(format!("stub_{}", new_id().replace('-', "")));
        }
        self.status = next;
        self.updated_at = now_millis();
        Ok(())
    }
}

impl Entity for Payment {
    type Id = String;

    fn id(&self) -> Self::Id {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let mut payment = Payment::new("e1".to_string(), 7500);
        assert_eq!(payment.status, PaymentStatus::Pending);

        payment.transition(PaymentStatus::Paid).unwrap();
        assert!(payment.reference.as_deref().unwrap().starts_with("stub_"));

        payment.transition(PaymentStatus::Refunded).unwrap();
        assert!(!payment.status.is_open());
    }

    #[test]
    fn test_rejects_invalid_transitions() {
        let mut payment = Payment::new("e1".to_string(), 100);
        assert!(payment.transition(PaymentStatus::Refunded).is_err());

        payment.transition(PaymentStatus::Failed).unwrap();
        assert!(matches!(
            payment.transition(PaymentStatus::Paid),
            Err(DomainError::InvalidInput(_))
        ));
        assert_eq!(payment.reference, None);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(PaymentStatus::from_str("refunded"), PaymentStatus::Refunded);
        assert_eq!(PaymentStatus::from_str("???"), PaymentStatus::Pending);
        assert_eq!(PaymentStatus::Failed.as_str(), "failed");
    }
}
