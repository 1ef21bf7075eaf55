//! Project documents and file downloads

use bytes::Bytes;
use pt_auth::RequestContext;
use pt_core::error::TrackerError;
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_files::{content_type_for, original_filename, storage_key};
use pt_models::{Document, DocumentType, NewDocument, UploadDocumentInput};
use tracing::{info, instrument, warn};

use crate::tracker::{not_found, Tracker};
use crate::validation::validate;

const DOCUMENT_PREFIX: &str = "documents";

/// A stored file ready to be sent back
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl Tracker {
    /// Attach a file to a visible project
    #[instrument(skip(self, ctx, input, bytes), fields(title = %input.title, size = bytes.len()))]
    pub async fn upload_document(
        &self,
        ctx: &RequestContext,
        project_id: Id,
        input: UploadDocumentInput,
        bytes: Bytes,
    ) -> TrackerResult<Document> {
        let user = ctx.require()?;
        validate(&input)?;
        let project = self.project_for(user, project_id).await?;

        let known_type = self
            .store
            .list_document_types()
            .await?
            .iter()
            .any(|t| t.id == input.document_type_id);
        if !known_type {
            return Err(TrackerError::invalid_field(
                "document_type_id",
                "must reference a document type",
            ));
        }

        let key = storage_key(DOCUMENT_PREFIX, &input.filename);
        self.files.put(&key, bytes).await?;

        let inserted = async {
            let mut tx = self.store.begin().await?;
            let document = tx
                .insert_document(NewDocument {
                    project_id: project.id,
                    title: input.title.trim().to_string(),
                    document_type_id: input.document_type_id,
                    file_key: Some(key.clone()),
                    author_id: user.id,
                })
                .await?;
            tx.commit().await?;
            TrackerResult::Ok(document)
        }
        .await;

        match inserted {
            Ok(document) => {
                info!(document_id = document.id, project_id, %key, "document uploaded");
                Ok(document)
            }
            Err(err) => {
                if let Err(cleanup) = self.files.delete(&key).await {
                    warn!(%key, error = %cleanup, "orphaned document blob");
                }
                Err(err)
            }
        }
    }

    /// File of a document in a visible project
    #[instrument(skip(self, ctx))]
    pub async fn download_document(&self, ctx: &RequestContext, document_id: Id) -> TrackerResult<Download> {
        let user = ctx.require()?;
        let document = self
            .store
            .find_document(document_id)
            .await?
            .ok_or_else(|| not_found("Document", document_id))?;
        self.project_for(user, document.project_id)
            .await
            .map_err(|e| hidden_document(e, document_id))?;

        let key = document
            .file_key
            .ok_or_else(|| not_found("File", document_id))?;
        self.download(&key).await
    }

    pub async fn project_documents(&self, ctx: &RequestContext, project_id: Id) -> TrackerResult<Vec<Document>> {
        let project = self.project_for(ctx.require()?, project_id).await?;
        Ok(self.store.list_documents(project.id).await?)
    }

    pub async fn document_types(&self, ctx: &RequestContext) -> TrackerResult<Vec<DocumentType>> {
        ctx.require()?;
        Ok(self.store.list_document_types().await?)
    }

    pub(crate) async fn download(&self, key: &str) -> TrackerResult<Download> {
        let bytes = self.files.get(key).await?;
        let filename = original_filename(key).to_string();
        Ok(Download {
            content_type: content_type_for(&filename),
            filename,
            bytes,
        })
    }
}

/// A document in a hidden project is reported as missing itself
fn hidden_document(err: TrackerError, document_id: Id) -> TrackerError {
    match err {
        TrackerError::NotFound { .. } => not_found("Document", document_id),
        other => other,
    }
}
