//! Notification sink
//!
//! Front door for reading and writing a user's notifications. Mutations that
//! emit notifications as part of a larger change write them through the
//! entity store transaction instead, so they commit or roll back together.

use std::sync::Arc;

use pt_core::error::TrackerError;
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_models::{NewNotification, Notification};
use tracing::{debug, info, instrument};

use crate::store::NotificationStore;

/// Size of the feed returned by [`NotificationSink::feed`]
pub const DEFAULT_FEED_LIMIT: usize = 50;
pub const MAX_FEED_LIMIT: usize = 200;

#[derive(Clone)]
pub struct NotificationSink {
    store: Arc<dyn NotificationStore>,
}

impl NotificationSink {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Append a notification. No deduplication: identical messages are kept.
    #[instrument(skip(self, message, link))]
    pub async fn enqueue(
        &self,
        user_id: Id,
        message: impl Into<String>,
        link: Option<String>,
    ) -> TrackerResult<Notification> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(TrackerError::invalid_field("message", "can't be blank"));
        }

        let notification = self
            .store
            .append(NewNotification {
                user_id,
                message,
                link,
            })
            .await?;
        debug!(notification_id = notification.id, "notification enqueued");
        Ok(notification)
    }

    pub async fn unread_count(&self, user_id: Id) -> TrackerResult<u64> {
        self.store.unread_count(user_id).await
    }

    /// Newest first; `limit` is clamped to `1..=MAX_FEED_LIMIT`
    pub async fn list_recent(&self, user_id: Id, limit: usize) -> TrackerResult<Vec<Notification>> {
        let limit = limit.clamp(1, MAX_FEED_LIMIT);
        self.store.list_recent(user_id, limit).await
    }

    #[instrument(skip(self))]
    pub async fn mark_all_read(&self, user_id: Id) -> TrackerResult<u64> {
        let marked = self.store.mark_all_read(user_id).await?;
        if marked > 0 {
            info!(marked, "notifications marked read");
        }
        Ok(marked)
    }

    pub async fn mark_read_for_link(&self, user_id: Id, link: &str) -> TrackerResult<u64> {
        self.store.mark_read_for_link(user_id, link).await
    }

    /// Notification page: the newest entries as they were, then everything
    /// becomes read.
    #[instrument(skip(self))]
    pub async fn feed(&self, user_id: Id) -> TrackerResult<Vec<Notification>> {
        let recent = self.store.list_recent(user_id, DEFAULT_FEED_LIMIT).await?;
        self.mark_all_read(user_id).await?;
        Ok(recent)
    }
}
