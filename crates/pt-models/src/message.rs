//! Project chat messages
//!
//! Table: project_messages

use chrono::{DateTime, Utc};
use pt_core::traits::{Entity, Id, Identifiable, ProjectScoped, Timestamped};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMessage {
    pub id: Id,
    pub project_id: Id,
    pub sender_id: Id,
    pub content: String,
    /// Customer asked for changes
    pub is_revision: bool,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for ProjectMessage {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for ProjectMessage {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ProjectScoped for ProjectMessage {
    fn project_id(&self) -> Id {
        self.project_id
    }
}

impl Entity for ProjectMessage {
    const TABLE_NAME: &'static str = "project_messages";
    const TYPE_NAME: &'static str = "ProjectMessage";
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProjectMessage {
    pub project_id: Id,
    pub sender_id: Id,
    pub content: String,
    pub is_revision: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageInput {
    #[validate(length(min = 1, max = 10000, message = "can't be blank"))]
    pub content: String,

    #[serde(default)]
    pub is_revision: bool,
}
