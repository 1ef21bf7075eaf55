//! # pt-notifications
//!
//! Append-only, per-recipient notification log.
//!
//! - [`NotificationStore`]: storage seam implemented by the entity stores
//! - [`NotificationSink`]: enqueue, unread count, mark-read, recent feed
//! - [`Notice`]: message templates for the events the engine emits

pub mod notice;
pub mod sink;
pub mod store;

pub use notice::{Notice, NoticeKind};
pub use sink::{NotificationSink, DEFAULT_FEED_LIMIT, MAX_FEED_LIMIT};
pub use store::{MemoryNotificationStore, NotificationStore};
