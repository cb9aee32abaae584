//! Project handlers
//!
//! The project detail endpoint returns the full rollup view; analysis runs
//! the configured provider over a snapshot of the same rollup.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use bl_core::error::{BlError, ValidationErrors};
use bl_core::pagination::Pagination;
use bl_core::traits::Id;
use bl_models::params::MilestoneParams;
use bl_models::project::Project;
use bl_services::analysis::AnalyzeProjectService;
use bl_services::milestones::CreateMilestoneService;
use bl_services::views::ViewService;

use crate::error::ApiResult;
use crate::extractors::{AppState, AuthenticatedUser};

/// GET /api/v1/projects
pub async fn list_projects(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<impl IntoResponse> {
    let page = state.stores.projects.list(pagination).await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectDto {
    pub name: String,
    pub description: Option<String>,
}

/// POST /api/v1/projects
pub async fn create_project(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(dto): Json<CreateProjectDto>,
) -> ApiResult<impl IntoResponse> {
    if dto.name.trim().is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "can't be blank");
        return Err(BlError::Validation(errors).into());
    }
    let mut project = Project::new(dto.name);
    project.description = dto.description;
    let created = state.stores.projects.create(project).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let view = ViewService::new(&state.stores).project_view(id).await?;
    Ok(Json(view))
}

/// GET /api/v1/projects/:id/analysis
pub async fn analyze_project(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    let analysis = AnalyzeProjectService::new(&state.stores, state.analysis.as_ref())
        .call(id)
        .await?;
    Ok(Json(analysis))
}

/// GET /api/v1/projects/:id/milestones
pub async fn list_milestones(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(project_id): Path<Id>,
) -> ApiResult<impl IntoResponse> {
    state.stores.projects.find(project_id).await?;
    let milestones = state.stores.milestones.list_for_project(project_id).await?;
    Ok(Json(milestones))
}

/// POST /api/v1/projects/:id/milestones
pub async fn create_milestone(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(project_id): Path<Id>,
    Json(params): Json<MilestoneParams>,
) -> ApiResult<impl IntoResponse> {
    let milestone = CreateMilestoneService::new(&user, &state.stores)
        .call(project_id, params)
        .await?;
    Ok((StatusCode::CREATED, Json(milestone)))
}
