//! Notification model
//!
//! Table: notifications. Rows are append-only; only `is_read` changes, and
//! only from `false` to `true`.

use chrono::{DateTime, Utc};
use pt_core::traits::{Entity, Id, Identifiable, Timestamped};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Id,
    pub user_id: Id,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    pub fn mark_read(&mut self) {
        self.is_read = true;
    }
}

impl Identifiable for Notification {
    fn id(&self) -> Id {
        self.id
    }
}

impl Timestamped for Notification {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Notification {
    const TABLE_NAME: &'static str = "notifications";
    const TYPE_NAME: &'static str = "Notification";
}

/// Insert struct; new notifications always start unread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub user_id: Id,
    pub message: String,
    pub link: Option<String>,
}

impl NewNotification {
    pub fn new(user_id: Id, message: impl Into<String>) -> Self {
        Self {
            user_id,
            message: message.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
