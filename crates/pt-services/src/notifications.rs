//! The caller's own notifications

use pt_auth::RequestContext;
use pt_core::result::TrackerResult;
use pt_models::Notification;

use crate::tracker::Tracker;

impl Tracker {
    pub async fn unread_notifications(&self, ctx: &RequestContext) -> TrackerResult<u64> {
        let user = ctx.require()?;
        self.notifications.unread_count(user.id).await
    }

    /// Newest notifications as they were before this call; afterwards all
    /// of them are read.
    pub async fn notification_feed(&self, ctx: &RequestContext) -> TrackerResult<Vec<Notification>> {
        let user = ctx.require()?;
        self.notifications.feed(user.id).await
    }

    pub async fn mark_notifications_read(&self, ctx: &RequestContext) -> TrackerResult<u64> {
        let user = ctx.require()?;
        self.notifications.mark_all_read(user.id).await
    }
}
