//! Milestone handlers
//!
//! The detail endpoint returns the composed view (financials, overdue flag,
//! risks with derived severity, payment requests). Material items are edited
//! through the read-modify-write store primitive, never by blind overwrite.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use bl_core::traits::Id;
use bl_models::journal::JournalKind;
use bl_models::milestone::{MaterialItem, MilestoneStatus};
use bl_models::params::{MilestoneParams, RiskParams, WeeklyUpdateParams};
use bl_services::milestones::{
    MaterialItemService, UpdateMilestoneService, UpdateMilestoneStatusService,
};
use bl_services::risks::CreateRiskService;
use bl_services::views::{RiskView, ViewService};
use bl_services::weekly_updates::RecordWeeklyUpdateService;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/v1/milestones/:id
pub async fn get_milestone(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let view = ViewService::new(&state.stores).milestone_view(id).await?;
    Ok(Json(view))
}

/// PATCH /api/v1/milestones/:id
pub async fn update_milestone(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(params): Json<MilestoneParams>,
) -> ApiResult<impl IntoResponse> {
    let milestone = UpdateMilestoneService::new(&user, &state.stores)
        .call(id, params)
        .await?;
    Ok(Json(milestone))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStatusDto {
    pub status: MilestoneStatus,
}

/// POST /api/v1/milestones/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<MilestoneStatusDto>,
) -> ApiResult<impl IntoResponse> {
    let milestone = UpdateMilestoneStatusService::new(&user, &state.stores)
        .call(id, dto.status)
        .await?;
    Ok(Json(milestone))
}

/// GET /api/v1/milestones/:id/journal
pub async fn journal(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.stores.milestones.find(id).await?;
    let entries = state
        .stores
        .journals
        .list_for_entity(JournalKind::Milestone, id)
        .await?;
    Ok(Json(entries))
}

/// POST /api/v1/milestones/:id/material-items
pub async fn add_material_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(item): Json<MaterialItem>,
) -> ApiResult<impl IntoResponse> {
    let milestone = MaterialItemService::new(&user, &state.stores)
        .add(id, item)
        .await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}

/// PUT /api/v1/milestones/:id/material-items/:index
pub async fn update_material_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, index)): Path<(Id, usize)>,
    Json(item): Json<MaterialItem>,
) -> ApiResult<impl IntoResponse> {
    let milestone = MaterialItemService::new(&user, &state.stores)
        .update(id, index, item)
        .await?;
    Ok(Json(milestone))
}

/// DELETE /api/v1/milestones/:id/material-items/:index
pub async fn remove_material_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, index)): Path<(Id, usize)>,
) -> ApiResult<impl IntoResponse> {
    let milestone = MaterialItemService::new(&user, &state.stores)
        .remove(id, index)
        .await?;
    Ok(Json(milestone))
}

/// GET /api/v1/milestones/:id/weekly-updates
pub async fn list_weekly_updates(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.stores.milestones.find(id).await?;
    let updates = state.stores.weekly_updates.list_for_milestone(id).await?;
    Ok(Json(updates))
}

/// POST /api/v1/milestones/:id/weekly-updates
pub async fn record_weekly_update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(params): Json<WeeklyUpdateParams>,
) -> ApiResult<impl IntoResponse> {
    let outcome = RecordWeeklyUpdateService::new(&user, &state.stores)
        .call(id, params)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /api/v1/milestones/:id/risks
pub async fn list_risks(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.stores.milestones.find(id).await?;
    let risks = state.stores.risks.list_for_milestone(id).await?;
    let views: Vec<RiskView> = risks.into_iter().map(RiskView::from).collect();
    Ok(Json(views))
}

/// POST /api/v1/milestones/:id/risks
pub async fn create_risk(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(params): Json<RiskParams>,
) -> ApiResult<impl IntoResponse> {
    let risk = CreateRiskService::new(&user, &state.stores)
        .call(id, params)
        .await?;
    Ok((StatusCode::CREATED, Json(RiskView::from(risk))))
}

/// GET /api/v1/milestones/:id/payment-requests
pub async fn list_payment_requests(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.stores.milestones.find(id).await?;
    let requests = state.stores.payments.list_for_milestone(id).await?;
    Ok(Json(requests))
}
