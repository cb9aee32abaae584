//! Payment request handlers
//!
//! Review is the only reviewer-gated write in the API; the decision body
//! mirrors the contract's input so a rejection without a reason fails with
//! the field map intact.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use bl_contracts::payments::ReviewInput;
use bl_core::traits::Id;
use bl_models::journal::JournalKind;
use bl_models::params::PaymentRequestParams;
use bl_models::payment_request::PaymentDecision;
use bl_services::payments::{ReviewPaymentRequestService, SubmitPaymentRequestService};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// POST /api/v1/payment-requests
pub async fn submit(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(params): Json<PaymentRequestParams>,
) -> ApiResult<impl IntoResponse> {
    let request = SubmitPaymentRequestService::new(&user, &state.stores)
        .call(params)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/v1/payment-requests/:id
pub async fn get_payment_request(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let request = state.stores.payments.find(id).await?;
    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub decision: PaymentDecision,
    pub rejection_reason: Option<String>,
    pub reviewer_notes: Option<String>,
}

/// POST /api/v1/payment-requests/:id/review
pub async fn review(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<ReviewDto>,
) -> ApiResult<impl IntoResponse> {
    let input = ReviewInput {
        decision: dto.decision,
        rejection_reason: dto.rejection_reason,
        reviewer_notes: dto.reviewer_notes,
    };
    let request = ReviewPaymentRequestService::new(&user, &state.stores)
        .call(id, input)
        .await?;
    Ok(Json(request))
}

/// GET /api/v1/payment-requests/:id/journal
pub async fn journal(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.stores.payments.find(id).await?;
    let entries = state
        .stores
        .journals
        .list_for_entity(JournalKind::PaymentRequest, id)
        .await?;
    Ok(Json(entries))
}
