//! Document handlers

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use pt_core::traits::Id;
use pt_models::{Document, DocumentType, UploadDocumentInput};

use super::{download_response, UploadForm};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{AppState, Auth};

/// GET /api/projects/:id/documents
pub async fn list_documents(
    State(state): State<AppState>,
    ctx: Auth,
    Path(project_id): Path<Id>,
) -> ApiResult<Json<Vec<Document>>> {
    Ok(Json(state.tracker.project_documents(&ctx, project_id).await?))
}

/// POST /api/projects/:id/documents
///
/// Multipart form: `title`, `documentTypeId` and a required `file`.
pub async fn upload_document(
    State(state): State<AppState>,
    ctx: Auth,
    Path(project_id): Path<Id>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form
        .take_file()
        .ok_or_else(|| ApiError::bad_request("A file is required"))?;
    let document_type_id = form
        .parse::<Id>("documentTypeId")?
        .ok_or_else(|| ApiError::bad_request("documentTypeId is required"))?;

    let input = UploadDocumentInput {
        title: form.text("title"),
        document_type_id,
        filename: file.filename,
    };
    let document = state
        .tracker
        .upload_document(&ctx, project_id, input, file.bytes)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /api/documents/:id/download
pub async fn download_document(
    State(state): State<AppState>,
    ctx: Auth,
    Path(id): Path<Id>,
) -> ApiResult<Response> {
    let download = state.tracker.download_document(&ctx, id).await?;
    Ok(download_response(download))
}

/// GET /api/document-types
pub async fn document_types(
    State(state): State<AppState>,
    ctx: Auth,
) -> ApiResult<Json<Vec<DocumentType>>> {
    Ok(Json(state.tracker.document_types(&ctx).await?))
}
