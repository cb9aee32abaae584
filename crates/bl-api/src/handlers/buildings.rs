//! Building handlers
//!
//! Buildings anchor the portfolio side: budgets hang off them, and income
//! and charge records feed the period rollup.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use bl_core::error::{BlError, ValidationErrors};
use bl_core::traits::Id;
use bl_models::building::Building;
use bl_models::income::{BuildingCharge, ChargeKind, IncomeKind, IncomeRecord};

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/v1/buildings
pub async fn list_buildings(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    let buildings = state.stores.buildings.list().await?;
    Ok(Json(buildings))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBuildingDto {
    pub name: String,
    pub address: Option<String>,
    pub total_units: i32,
    #[serde(default)]
    pub occupied_units: i32,
}

/// POST /api/v1/buildings
pub async fn create_building(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<CreateBuildingDto>,
) -> ApiResult<impl IntoResponse> {
    let mut errors = ValidationErrors::new();
    if dto.name.trim().is_empty() {
        errors.add("name", "can't be blank");
    }
    if dto.total_units < 0 {
        errors.add("totalUnits", "must be greater than or equal to 0");
    }
    if dto.occupied_units < 0 || dto.occupied_units > dto.total_units {
        errors.add("occupiedUnits", "must be between 0 and totalUnits");
    }
    errors.into_result().map_err(BlError::Validation)?;

    let mut building = Building::new(dto.name, dto.total_units);
    building.address = dto.address;
    building.occupied_units = dto.occupied_units;
    let created = state.stores.buildings.create(building).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/buildings/:id
pub async fn get_building(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let building = state.stores.buildings.find(id).await?;
    Ok(Json(building))
}

/// GET /api/v1/buildings/:id/budgets
pub async fn list_budgets(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.stores.buildings.find(id).await?;
    let budgets = state.stores.budgets.list_for_building(id).await?;
    Ok(Json(budgets))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeDto {
    pub kind: IncomeKind,
    pub amount: f64,
    pub date: NaiveDate,
}

/// POST /api/v1/buildings/:id/incomes
pub async fn record_income(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<IncomeDto>,
) -> ApiResult<impl IntoResponse> {
    state.stores.buildings.find(id).await?;
    non_negative(dto.amount)?;
    let income = state
        .stores
        .incomes
        .add_income(IncomeRecord {
            id: None,
            building_id: id,
            kind: dto.kind,
            amount: dto.amount,
            date: dto.date,
            created_at: None,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(income)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeDto {
    pub kind: ChargeKind,
    pub amount: f64,
    pub date: NaiveDate,
}

/// POST /api/v1/buildings/:id/charges
pub async fn record_charge(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
    Json(dto): Json<ChargeDto>,
) -> ApiResult<impl IntoResponse> {
    state.stores.buildings.find(id).await?;
    non_negative(dto.amount)?;
    let charge = state
        .stores
        .incomes
        .add_charge(BuildingCharge {
            id: None,
            building_id: id,
            kind: dto.kind,
            amount: dto.amount,
            date: dto.date,
            created_at: None,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(charge)))
}

fn non_negative(amount: f64) -> Result<(), BlError> {
    if amount < 0.0 {
        let mut errors = ValidationErrors::new();
        errors.add("amount", "must be greater than or equal to 0");
        return Err(BlError::Validation(errors));
    }
    Ok(())
}
