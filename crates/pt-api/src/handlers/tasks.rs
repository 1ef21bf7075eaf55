//! Task handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use pt_core::traits::Id;
use pt_core::types::TaskStatus;
use pt_models::{CreateTaskInput, StatusTimeline, Task};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, Auth};

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: TaskStatus,
}

/// GET /api/tasks
pub async fn list_tasks(State(state): State<AppState>, ctx: Auth) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.tracker.visible_tasks(&ctx).await?))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    ctx: Auth,
    Json(input): Json<CreateTaskInput>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.tracker.create_task(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/tasks/:id
pub async fn get_task(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tracker.task(&ctx, id).await?))
}

/// POST /api/tasks/:id/complete
pub async fn complete_task(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tracker.complete_task(&ctx, id).await?))
}

/// POST /api/tasks/:id/status
pub async fn change_status(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<Task>> {
    Ok(Json(state.tracker.change_task_status(&ctx, id, request.status).await?))
}

/// GET /api/tasks/:id/history
pub async fn history(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<StatusTimeline>> {
    Ok(Json(state.tracker.task_timeline(&ctx, id).await?))
}
