//! Weekly update handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use bl_core::traits::Id;
use bl_models::params::WeeklyUpdateParams;
use bl_services::weekly_updates::{DeleteWeeklyUpdateService, EditWeeklyUpdateService};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// PATCH /api/v1/weekly-updates/:id
pub async fn edit_weekly_update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(params): Json<WeeklyUpdateParams>,
) -> ApiResult<impl IntoResponse> {
    let outcome = EditWeeklyUpdateService::new(&user, &state.stores)
        .call(id, params)
        .await?;
    Ok(Json(outcome))
}

/// DELETE /api/v1/weekly-updates/:id
pub async fn delete_weekly_update(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    DeleteWeeklyUpdateService::new(&user, &state.stores)
        .call(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
