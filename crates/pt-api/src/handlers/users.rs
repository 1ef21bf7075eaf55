//! Staff directory and workload report

use axum::{extract::State, Json};
use pt_db::WorkloadEntry;
use pt_models::UserSummary;

use crate::error::ApiResult;
use crate::extractors::{AppState, Auth};

/// GET /api/users/employees
pub async fn employees(State(state): State<AppState>, ctx: Auth) -> ApiResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.tracker.employees(&ctx).await?))
}

/// GET /api/users/customers
pub async fn customers(State(state): State<AppState>, ctx: Auth) -> ApiResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.tracker.customers(&ctx).await?))
}

/// GET /api/users/workload
pub async fn workload(State(state): State<AppState>, ctx: Auth) -> ApiResult<Json<Vec<WorkloadEntry>>> {
    Ok(Json(state.tracker.workload(&ctx).await?))
}
