//! Notification handlers

use axum::{extract::State, Json};
use pt_models::Notification;
use serde::Serialize;

use crate::error::ApiResult;
use crate::extractors::{AppState, Auth};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkedRead {
    pub marked: u64,
}

/// GET /api/notifications/unread
pub async fn unread_count(State(state): State<AppState>, ctx: Auth) -> ApiResult<Json<UnreadCount>> {
    let unread = state.tracker.unread_notifications(&ctx).await?;
    Ok(Json(UnreadCount { unread }))
}

/// GET /api/notifications
///
/// Returns the newest notifications and marks all of them read.
pub async fn feed(State(state): State<AppState>, ctx: Auth) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(state.tracker.notification_feed(&ctx).await?))
}

/// POST /api/notifications/read
pub async fn mark_all_read(State(state): State<AppState>, ctx: Auth) -> ApiResult<Json<MarkedRead>> {
    let marked = state.tracker.mark_notifications_read(&ctx).await?;
    Ok(Json(MarkedRead { marked }))
}
