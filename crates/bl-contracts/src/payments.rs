//! Contracts for the payment request workflow
//!
//! Submitting is open to the contractor raising the claim; deciding is
//! reviewer-gated. The PENDING-only transition rule is not checked here but
//! in the model validator and the store's conditional update, so it holds
//! regardless of caller identity.

use bl_core::error::{BlError, ValidationErrors};
use bl_core::result::BlResult;
use bl_core::user::UserContext;
use bl_models::params::PaymentRequestParams;
use bl_models::payment_request::PaymentDecision;

use crate::base::{run_derive_validation, Contract, ValidationResult};

/// Contract for submitting a new payment request
pub struct SubmitPaymentContract<'a> {
    #[allow(dead_code)]
    user: &'a UserContext,
}

impl<'a> SubmitPaymentContract<'a> {
    pub fn new(user: &'a UserContext) -> Self {
        Self { user }
    }
}

impl<'a> Contract<PaymentRequestParams> for SubmitPaymentContract<'a> {
    fn validate(&self, params: &PaymentRequestParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        run_derive_validation(&mut errors, params);
        errors.into_result()
    }
}

/// A reviewer's decision input
#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub decision: PaymentDecision,
    pub rejection_reason: Option<String>,
    pub reviewer_notes: Option<String>,
}

/// Contract for reviewing a pending payment request
pub struct ReviewPaymentContract<'a> {
    user: &'a UserContext,
}

impl<'a> ReviewPaymentContract<'a> {
    pub fn new(user: &'a UserContext) -> Self {
        Self { user }
    }
}

impl<'a> Contract<ReviewInput> for ReviewPaymentContract<'a> {
    fn authorize(&self) -> BlResult<()> {
        if self.user.can_review_payments() {
            Ok(())
        } else {
            Err(BlError::forbidden(
                "reviewing payment requests requires a property manager or admin role",
            ))
        }
    }

    fn validate(&self, input: &ReviewInput) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if input.decision == PaymentDecision::Rejected {
            let reason_blank = input
                .rejection_reason
                .as_deref()
                .map(|r| r.trim().is_empty())
                .unwrap_or(true);
            if reason_blank {
                errors.add("rejection_reason", "can't be blank when rejecting");
            }
        }
        errors.into_result()
    }
}
