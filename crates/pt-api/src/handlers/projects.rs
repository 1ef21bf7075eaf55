//! Project handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use pt_core::traits::Id;
use pt_models::{
    BudgetCategory, BudgetItem, CreateProjectInput, NewBudgetItem, NewProjectStage,
    PostMessageInput, Project, ProjectMessage, ProjectStage,
};
use pt_services::{ExportKind, ProjectDetail};
use serde::Deserialize;

use super::file_response;
use crate::error::ApiResult;
use crate::extractors::{AppState, Auth};

/// GET /api/projects
pub async fn list_projects(State(state): State<AppState>, ctx: Auth) -> ApiResult<Json<Vec<Project>>> {
    Ok(Json(state.tracker.visible_projects(&ctx).await?))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    ctx: Auth,
    Json(input): Json<CreateProjectInput>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.tracker.create_project(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<ProjectDetail>> {
    Ok(Json(state.tracker.project_detail(&ctx, id).await?))
}

/// POST /api/projects/:id/stages
pub async fn add_stage(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
    Json(stage): Json<NewProjectStage>,
) -> ApiResult<(StatusCode, Json<ProjectStage>)> {
    let stage = state.tracker.add_stage(&ctx, id, stage).await?;
    Ok((StatusCode::CREATED, Json(stage)))
}

/// POST /api/projects/:id/budget
pub async fn add_budget_item(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
    Json(item): Json<NewBudgetItem>,
) -> ApiResult<(StatusCode, Json<BudgetItem>)> {
    let item = state.tracker.add_budget_item(&ctx, id, item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/projects/:id/messages
pub async fn list_messages(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<Vec<ProjectMessage>>> {
    Ok(Json(state.tracker.project_messages(&ctx, id).await?))
}

/// POST /api/projects/:id/messages
pub async fn post_message(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
    Json(input): Json<PostMessageInput>,
) -> ApiResult<(StatusCode, Json<ProjectMessage>)> {
    let message = state.tracker.post_message(&ctx, id, input).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /api/projects/:id/export/:kind
///
/// `kind` is `budget_sheet` or `brief`.
pub async fn export_project(
    State(state): State<AppState>,
    ctx: Auth,
    Path((id, kind)): Path<(Id, ExportKind)>,
) -> ApiResult<Response> {
    let file = state.tracker.export_project(&ctx, id, kind).await?;
    Ok(file_response(&file.filename, file.content_type, file.bytes))
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

/// GET /api/budget-categories
pub async fn budget_categories(
    State(state): State<AppState>,
    ctx: Auth,
) -> ApiResult<Json<Vec<BudgetCategory>>> {
    Ok(Json(state.tracker.budget_categories(&ctx).await?))
}

/// POST /api/budget-categories
pub async fn create_budget_category(
    State(state): State<AppState>,
    ctx: Auth,
    Json(request): Json<CategoryRequest>,
) -> ApiResult<(StatusCode, Json<BudgetCategory>)> {
    let category = state.tracker.create_budget_category(&ctx, &request.name).await?;
    Ok((StatusCode::CREATED, Json(category)))
}
