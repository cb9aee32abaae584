//! Building budget handlers
//!
//! Spend totals and health are never stored; the detail endpoint and the
//! expense endpoint both return summaries recomputed over the full ledger.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use bl_core::traits::Id;
use bl_models::budget::{BudgetStatus, CategoryAllocations};
use bl_models::journal::JournalKind;
use bl_models::params::{BudgetExpenseParams, BudgetParams};
use bl_services::budgets::{
    AddBudgetExpenseService, CreateBudgetService, UpdateAllocationsService,
    UpdateBudgetStatusService,
};
use bl_services::views::ViewService;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// POST /api/v1/budgets
pub async fn create_budget(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(params): Json<BudgetParams>,
) -> ApiResult<impl IntoResponse> {
    let budget = CreateBudgetService::new(&user, &state.stores)
        .call(params)
        .await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

/// GET /api/v1/budgets/:id
pub async fn get_budget(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let view = ViewService::new(&state.stores).budget_view(id).await?;
    Ok(Json(view))
}

/// PUT /api/v1/budgets/:id/allocations
pub async fn update_allocations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(allocations): Json<CategoryAllocations>,
) -> ApiResult<impl IntoResponse> {
    let budget = UpdateAllocationsService::new(&user, &state.stores)
        .call(id, allocations)
        .await?;
    Ok(Json(budget))
}

/// POST /api/v1/budgets/:id/expenses
pub async fn add_expense(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(params): Json<BudgetExpenseParams>,
) -> ApiResult<impl IntoResponse> {
    let summary = AddBudgetExpenseService::new(&user, &state.stores)
        .call(id, params)
        .await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// GET /api/v1/budgets/:id/expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.stores.budgets.find(id).await?;
    let expenses = state.stores.budgets.list_expenses(id).await?;
    Ok(Json(expenses))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatusDto {
    pub status: BudgetStatus,
}

/// POST /api/v1/budgets/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<BudgetStatusDto>,
) -> ApiResult<impl IntoResponse> {
    let budget = UpdateBudgetStatusService::new(&user, &state.stores)
        .call(id, dto.status)
        .await?;
    Ok(Json(budget))
}

/// GET /api/v1/budgets/:id/journal
pub async fn journal(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.stores.budgets.find(id).await?;
    let entries = state
        .stores
        .journals
        .list_for_entity(JournalKind::BuildingBudget, id)
        .await?;
    Ok(Json(entries))
}
