//! Lead handlers

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::NaiveDate;
use pt_core::traits::Id;
use pt_models::{CreateLeadInput, Lead};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{download_response, UploadForm};
use crate::error::ApiResult;
use crate::extractors::{AppState, Auth};

/// Outcome of an approval request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    /// False when the lead had already been decided
    pub applied: bool,
    pub lead: Lead,
}

/// GET /api/leads
pub async fn list_leads(State(state): State<AppState>, ctx: Auth) -> ApiResult<Json<Vec<Lead>>> {
    Ok(Json(state.tracker.visible_leads(&ctx).await?))
}

/// POST /api/leads
///
/// Multipart form: `title`, `description`, `budget`, `desiredDeadline`
/// (YYYY-MM-DD) and an optional `file`.
pub async fn create_lead(
    State(state): State<AppState>,
    ctx: Auth,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Lead>)> {
    let mut form = UploadForm::read(multipart).await?;
    let input = CreateLeadInput {
        title: form.text("title"),
        description: form.text("description"),
        budget: form.parse::<Decimal>("budget")?.unwrap_or_default(),
        desired_deadline: form.parse::<NaiveDate>("desiredDeadline")?,
    };
    let lead = state.tracker.create_lead(&ctx, input, form.take_file()).await?;
    Ok((StatusCode::CREATED, Json(lead)))
}

/// GET /api/leads/:id
pub async fn get_lead(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<Lead>> {
    Ok(Json(state.tracker.lead(&ctx, id).await?))
}

/// POST /api/leads/:id/approve
pub async fn approve_lead(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<ApprovalResponse>> {
    let outcome = state.tracker.approve_lead(&ctx, id).await?;
    Ok(Json(ApprovalResponse {
        applied: outcome.is_applied(),
        lead: outcome.into_value(),
    }))
}

/// POST /api/leads/:id/reject
pub async fn reject_lead(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Json<Lead>> {
    Ok(Json(state.tracker.reject_lead(&ctx, id).await?))
}

/// GET /api/leads/:id/attachment
pub async fn download_attachment(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Response> {
    let download = state.tracker.lead_attachment(&ctx, id).await?;
    Ok(download_response(download))
}
