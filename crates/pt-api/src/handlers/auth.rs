//! Session and profile handlers

use axum::{extract::State, Json};
use pt_models::{ProfileUpdate, User};
use pt_services::LoginOutcome;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, Auth};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginOutcome>> {
    let outcome = state.tracker.login(&request.username, &request.password).await?;
    Ok(Json(outcome))
}

/// GET /api/me
pub async fn me(State(state): State<AppState>, ctx: Auth) -> ApiResult<Json<User>> {
    Ok(Json(state.tracker.me(&ctx).await?))
}

/// PATCH /api/me
pub async fn update_me(
    State(state): State<AppState>,
    ctx: Auth,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.tracker.update_profile(&ctx, update).await?))
}
