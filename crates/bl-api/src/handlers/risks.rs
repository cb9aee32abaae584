//! Risk handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use bl_core::traits::Id;
use bl_models::params::RiskParams;
use bl_models::risk::RiskStatus;
use bl_services::risks::{DeleteRiskService, UpdateRiskService, UpdateRiskStatusService};
use bl_services::views::RiskView;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// PATCH /api/v1/risks/:id
pub async fn update_risk(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(params): Json<RiskParams>,
) -> ApiResult<impl IntoResponse> {
    let risk = UpdateRiskService::new(&user, &state.stores)
        .call(id, params)
        .await?;
    Ok(Json(RiskView::from(risk)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskStatusDto {
    pub status: RiskStatus,
}

/// POST /api/v1/risks/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<RiskStatusDto>,
) -> ApiResult<impl IntoResponse> {
    let risk = UpdateRiskStatusService::new(&user, &state.stores)
        .call(id, dto.status)
        .await?;
    Ok(Json(RiskView::from(risk)))
}

/// DELETE /api/v1/risks/:id
pub async fn delete_risk(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    DeleteRiskService::new(&user, &state.stores).call(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
