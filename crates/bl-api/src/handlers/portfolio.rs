//! Portfolio rollup handler

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use bl_core::traits::Id;
use bl_services::views::ViewService;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, AuthenticatedUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialsQuery {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Comma-separated building ids; absent means the whole portfolio.
    pub building_ids: Option<String>,
}

/// GET /api/v1/portfolio/financials
pub async fn financials(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<FinancialsQuery>,
) -> ApiResult<impl IntoResponse> {
    if query.period_end < query.period_start {
        return Err(ApiError::bad_request("periodEnd is before periodStart"));
    }

    let filter = match &query.building_ids {
        Some(raw) => Some(parse_ids(raw)?),
        None => None,
    };

    let rollup = ViewService::new(&state.stores)
        .portfolio_view(query.period_start, query.period_end, filter.as_deref())
        .await?;
    Ok(Json(rollup))
}

fn parse_ids(raw: &str) -> Result<Vec<Id>, ApiError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Id>()
                .map_err(|_| ApiError::bad_request(format!("invalid building id: {s}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_ids("1,2, 3").unwrap(), vec![1, 2, 3]);
        assert!(parse_ids("1,x").is_err());
        assert_eq!(parse_ids("").unwrap(), Vec::<Id>::new());
    }
}
