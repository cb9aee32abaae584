//! API routes
//!
//! One nested router per resource under `/api/v1`. Child collections hang
//! off their parent (`/projects/:id/milestones`, `/milestones/:id/risks`);
//! status changes are explicit sub-resources rather than PATCH fields.

use axum::{
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::Serialize;

use crate::extractors::AppState;
use crate::handlers::{
    budgets, buildings, milestones, payments, portfolio, projects, risks, weekly_updates,
};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_router())
}

fn api_v1_router() -> Router<AppState> {
    Router::new()
        .route("/", get(api_root))
        .nest("/projects", projects_router())
        .nest("/milestones", milestones_router())
        .nest("/weekly-updates", weekly_updates_router())
        .nest("/risks", risks_router())
        .nest("/payment-requests", payments_router())
        .nest("/buildings", buildings_router())
        .nest("/budgets", budgets_router())
        .nest("/portfolio", portfolio_router())
}

fn projects_router() -> Router<AppState> {
    Router::new()
        .route("/", get(projects::list_projects))
        .route("/", post(projects::create_project))
        .route("/:id", get(projects::get_project))
        .route("/:id/analysis", get(projects::analyze_project))
        .route("/:id/milestones", get(projects::list_milestones))
        .route("/:id/milestones", post(projects::create_milestone))
}

fn milestones_router() -> Router<AppState> {
    Router::new()
        .route("/:id", get(milestones::get_milestone))
        .route("/:id", patch(milestones::update_milestone))
        .route("/:id/status", post(milestones::update_status))
        .route("/:id/journal", get(milestones::journal))
        .route("/:id/material-items", post(milestones::add_material_item))
        .route(
            "/:id/material-items/:index",
            put(milestones::update_material_item),
        )
        .route(
            "/:id/material-items/:index",
            delete(milestones::remove_material_item),
        )
        .route("/:id/weekly-updates", get(milestones::list_weekly_updates))
        .route("/:id/weekly-updates", post(milestones::record_weekly_update))
        .route("/:id/risks", get(milestones::list_risks))
        .route("/:id/risks", post(milestones::create_risk))
        .route(
            "/:id/payment-requests",
            get(milestones::list_payment_requests),
        )
}

fn weekly_updates_router() -> Router<AppState> {
    Router::new()
        .route("/:id", patch(weekly_updates::edit_weekly_update))
        .route("/:id", delete(weekly_updates::delete_weekly_update))
}

fn risks_router() -> Router<AppState> {
    Router::new()
        .route("/:id", patch(risks::update_risk))
        .route("/:id", delete(risks::delete_risk))
        .route("/:id/status", post(risks::update_status))
}

fn payments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(payments::submit))
        .route("/:id", get(payments::get_payment_request))
        .route("/:id/review", post(payments::review))
        .route("/:id/journal", get(payments::journal))
}

fn buildings_router() -> Router<AppState> {
    Router::new()
        .route("/", get(buildings::list_buildings))
        .route("/", post(buildings::create_building))
        .route("/:id", get(buildings::get_building))
        .route("/:id/budgets", get(buildings::list_budgets))
        .route("/:id/incomes", post(buildings::record_income))
        .route("/:id/charges", post(buildings::record_charge))
}

fn budgets_router() -> Router<AppState> {
    Router::new()
        .route("/", post(budgets::create_budget))
        .route("/:id", get(budgets::get_budget))
        .route("/:id/allocations", put(budgets::update_allocations))
        .route("/:id/expenses", get(budgets::list_expenses))
        .route("/:id/expenses", post(budgets::add_expense))
        .route("/:id/status", post(budgets::update_status))
        .route("/:id/journal", get(budgets::journal))
}

fn portfolio_router() -> Router<AppState> {
    Router::new().route("/financials", get(portfolio::financials))
}

async fn api_root() -> Json<ApiRoot> {
    Json(ApiRoot {
        instance_name: "BuildLedger RS",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRoot {
    instance_name: &'static str,
    version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    use bl_services::analysis::HeuristicAnalysisProvider;
    use bl_store::ports::Stores;

    fn test_app() -> Router {
        let state = AppState::new(Stores::in_memory(), Arc::new(HeuristicAnalysisProvider));
        router().with_state(state)
    }

    fn authed(method: Method, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-user-id", "1")
            .header("x-user-role", "admin");
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_api_root() {
        let response = test_app()
            .oneshot(Request::builder().uri("/api/v1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_identity_headers_rejected() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/projects")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_and_fetch_project() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(authed(
                Method::POST,
                "/api/v1/projects",
                Some(serde_json::json!({ "name": "Block C Renovation" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(authed(Method::GET, "/api/v1/projects/1", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_blank_project_name_is_unprocessable() {
        let response = test_app()
            .oneshot(authed(
                Method::POST,
                "/api/v1/projects",
                Some(serde_json::json!({ "name": "  " })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_milestone_is_not_found() {
        let response = test_app()
            .oneshot(authed(Method::GET, "/api/v1/milestones/99", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_portfolio_financials_requires_period() {
        let response = test_app()
            .oneshot(authed(Method::GET, "/api/v1/portfolio/financials", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = test_app()
            .oneshot(authed(
                Method::GET,
                "/api/v1/portfolio/financials?periodStart=2026-01-01&periodEnd=2026-03-31",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
