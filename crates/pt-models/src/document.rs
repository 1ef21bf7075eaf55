//! Project documents
//!
//! Table: documents. File bytes live in blob storage; the row keeps the key.

use chrono::{DateTime, Utc};
use pt_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Id,
    pub project_id: Id,
    pub title: String,
    pub document_type_id: Id,
    pub file_key: Option<String>,
    pub author_id: Id,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Document {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Document {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ProjectScoped for Document {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

impl Entity for Document {
    const TABLE_NAME: &'static str = "documents";
    const TYPE_NAME: &'static str = "Document";
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub project_id: Id,
    pub title: String,
    pub document_type_id: Id,
    pub file_key: Option<String>,
    pub author_id: Id,
}

/// Metadata accompanying an uploaded blob
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadDocumentInput {
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub title: String,

    pub document_type_id: Id,

    /// Original filename, used for the storage key and content type
    #[validate(length(min = 1, max = 255, message = "can't be blank"))]
    pub filename: String,
}
