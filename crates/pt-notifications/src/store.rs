//! Notification storage

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_models::{NewNotification, Notification};
use tokio::sync::RwLock;

/// Notification storage.
///
/// `mark_all_read` must be a single atomic step with respect to concurrent
/// `append`s: a racing append may end up read or unread, but is never lost.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Append an unread notification
    async fn append(&self, notification: NewNotification) -> TrackerResult<Notification>;

    async fn unread_count(&self, user_id: Id) -> TrackerResult<u64>;

    /// Newest first, at most `limit` rows
    async fn list_recent(&self, user_id: Id, limit: usize) -> TrackerResult<Vec<Notification>>;

    /// Returns the number of rows that flipped to read
    async fn mark_all_read(&self, user_id: Id) -> TrackerResult<u64>;

    /// Mark the user's unread notifications pointing at `link` as read
    async fn mark_read_for_link(&self, user_id: Id, link: &str) -> TrackerResult<u64>;
}

/// In-memory notification store
pub struct MemoryNotificationStore {
    notifications: RwLock<Vec<Notification>>,
    next_id: AtomicI64,
}

impl Default for MemoryNotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self {
            notifications: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn mark_where(notifications: &mut [Notification], pred: impl Fn(&Notification) -> bool) -> u64 {
        let mut count = 0;
        for n in notifications.iter_mut().filter(|n| n.is_unread() && pred(n)) {
            n.mark_read();
            count += 1;
        }
        count
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn append(&self, new: NewNotification) -> TrackerResult<Notification> {
        let notification = Notification {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: new.user_id,
            message: new.message,
            link: new.link,
            is_read: false,
            created_at: Utc::now(),
        };
        self.notifications.write().await.push(notification.clone());
        Ok(notification)
    }

    async fn unread_count(&self, user_id: Id) -> TrackerResult<u64> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.is_unread())
            .count() as u64)
    }

    async fn list_recent(&self, user_id: Id, limit: usize) -> TrackerResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        // Vec order is append order
        Ok(notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn mark_all_read(&self, user_id: Id) -> TrackerResult<u64> {
        let mut notifications = self.notifications.write().await;
        Ok(Self::mark_where(&mut notifications, |n| n.user_id == user_id))
    }

    async fn mark_read_for_link(&self, user_id: Id, link: &str) -> TrackerResult<u64> {
        let mut notifications = self.notifications.write().await;
        Ok(Self::mark_where(&mut notifications, |n| {
            n.user_id == user_id && n.link.as_deref() == Some(link)
        }))
    }
}
