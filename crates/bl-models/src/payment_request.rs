//! Payment request model and its strict state machine
//!
//! Unlike the risk and milestone graphs, this one is hard: PENDING may move
//! to APPROVED or REJECTED, and both of those are terminal. The validator
//! here is one of three enforcement layers (model, service, store CAS).

use bl_core::error::BlError;
use bl_core::traits::{Entity, Id, Identifiable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "APPROVED" => Some(Self::Approved),
            "REJECTED" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }

    /// Only `PENDING -> {APPROVED, REJECTED}` is legal.
    pub fn validate_transition(from: Self, to: Self) -> Result<(), BlError> {
        match (from, to) {
            (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected) => Ok(()),
            _ => Err(BlError::invalid_state(
                PaymentRequest::TYPE_NAME,
                from.as_str(),
                format!("transition to {}", to.as_str()),
            )),
        }
    }
}

/// The reviewer's decision on a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentDecision {
    Approved,
    Rejected,
}

impl PaymentDecision {
    pub fn to_status(self) -> PaymentStatus {
        match self {
            Self::Approved => PaymentStatus::Approved,
            Self::Rejected => PaymentStatus::Rejected,
        }
    }
}

/// A contractor's claim for payment against a milestone
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub id: Option<Id>,
    pub milestone_id: Id,
    pub contractor_id: Id,
    /// System-assigned, unique, `PR-{year}-{seq:06}`
    pub request_number: String,
    pub calculated_amount: f64,
    pub status: PaymentStatus,
    /// Required content when the decision is REJECTED; stored verbatim
    pub rejection_reason: Option<String>,
    pub reviewer_notes: Option<String>,
    pub reviewed_by: Option<Id>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl PaymentRequest {
    pub fn new(milestone_id: Id, contractor_id: Id, calculated_amount: f64) -> Self {
        Self {
            milestone_id,
            contractor_id,
            calculated_amount,
            status: PaymentStatus::Pending,
            ..Default::default()
        }
    }

    /// Format a request number from a year and a sequence value.
    pub fn format_request_number(year: i32, seq: i64) -> String {
        format!("PR-{}-{:06}", year, seq)
    }
}

impl Identifiable for PaymentRequest {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Entity for PaymentRequest {
    const TABLE_NAME: &'static str = "payment_requests";
    const TYPE_NAME: &'static str = "PaymentRequest";
}

#[cfg(test)]
mod tests {
    use super::*;
    use PaymentStatus::*;

    #[test]
    fn test_only_pending_transitions_allowed() {
        assert!(PaymentStatus::validate_transition(Pending, Approved).is_ok());
        assert!(PaymentStatus::validate_transition(Pending, Rejected).is_ok());

        for from in [Approved, Rejected] {
            for to in [Pending, Approved, Rejected] {
                let result = PaymentStatus::validate_transition(from, to);
                assert!(
                    matches!(result, Err(BlError::InvalidState { .. })),
                    "{:?} -> {:?} must be rejected",
                    from,
                    to
                );
            }
        }
        // Self-transition from PENDING is not a decision either.
        assert!(PaymentStatus::validate_transition(Pending, Pending).is_err());
    }

    #[test]
    fn test_request_number_format() {
        assert_eq!(
            PaymentRequest::format_request_number(2026, 42),
            "PR-2026-000042"
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(!Pending.is_terminal());
        assert!(Approved.is_terminal());
        assert!(Rejected.is_terminal());
    }
}
