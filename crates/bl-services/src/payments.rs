//! Payment request workflow services
//!
//! The PENDING-only rule is enforced three times over: the contract never
//! sees it (it is not an input problem), the model's transition validator
//! rejects it, and the store's conditional update makes the check-and-set
//! atomic against racing reviewers. Role gating lives in the review
//! contract; the state machine holds regardless of who calls.

use tracing::info;

use bl_contracts::base::Contract;
use bl_contracts::payments::{ReviewInput, ReviewPaymentContract, SubmitPaymentContract};
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_core::user::UserContext;
use bl_models::journal::{JournalEntry, JournalKind};
use bl_models::params::PaymentRequestParams;
use bl_models::payment_request::{PaymentDecision, PaymentRequest};
use bl_store::Stores;

pub struct SubmitPaymentRequestService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> SubmitPaymentRequestService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, params: PaymentRequestParams) -> BlResult<PaymentRequest> {
        self.stores.milestones.find(params.milestone_id).await?;
        SubmitPaymentContract::new(self.user).check(&params)?;

        let request = PaymentRequest::new(
            params.milestone_id,
            self.user.user_id,
            params.calculated_amount,
        );
        let request = self.stores.payments.create(request).await?;
        info!(
            request_id = request.id,
            request_number = %request.request_number,
            milestone_id = params.milestone_id,
            amount = params.calculated_amount,
            "payment request submitted"
        );
        Ok(request)
    }
}

pub struct ReviewPaymentRequestService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> ReviewPaymentRequestService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, request_id: Id, input: ReviewInput) -> BlResult<PaymentRequest> {
        ReviewPaymentContract::new(self.user).check(&input)?;

        let decision = input.decision;
        let request = self
            .stores
            .payments
            .decide(
                request_id,
                decision,
                input.rejection_reason,
                input.reviewer_notes,
                self.user.user_id,
            )
            .await?;

        let action = match decision {
            PaymentDecision::Approved => "approved",
            PaymentDecision::Rejected => "rejected",
        };
        info!(
            request_id,
            request_number = %request.request_number,
            decision = action,
            reviewer = self.user.user_id,
            "payment request decided"
        );
        self.stores
            .journals
            .append(
                JournalEntry::new(
                    JournalKind::PaymentRequest,
                    request_id,
                    self.user.user_id,
                    action,
                )
                .with_detail(request.request_number.clone()),
            )
            .await?;

        Ok(request)
    }
}
