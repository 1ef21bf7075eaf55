//! The engine façade
//!
//! Every operation takes the caller's [`RequestContext`] explicitly. Reads
//! resolve a scope through [`pt_auth::Policy`]; mutations run in one store
//! transaction that also carries the notifications they emit.

use std::sync::Arc;

use pt_auth::{CurrentUser, JwtService};
use pt_core::config::AuthConfig;
use pt_core::error::TrackerError;
use pt_core::result::TrackerResult;
use pt_core::traits::Id;
use pt_db::{Store, StoreTransaction};
use pt_files::Storage;
use pt_notifications::{Notice, NotificationSink, NotificationStore};

/// Project Tracker engine
pub struct Tracker {
    pub(crate) store: Arc<dyn Store>,
    pub(crate) notifications: NotificationSink,
    pub(crate) files: Arc<dyn Storage>,
    pub(crate) jwt: JwtService,
    pub(crate) token_ttl_seconds: u64,
}

impl Tracker {
    pub fn new<S>(store: Arc<S>, files: Arc<dyn Storage>, auth: &AuthConfig) -> Self
    where
        S: Store + 'static,
    {
        let notification_store: Arc<dyn NotificationStore> = store.clone();
        Self {
            store,
            notifications: NotificationSink::new(notification_store),
            files,
            jwt: JwtService::new(auth.jwt_secret.as_bytes()),
            token_ttl_seconds: auth.token_expiration_seconds,
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}

/// Name shown for the actor in notification texts
pub(crate) async fn actor_name(
    tx: &mut Box<dyn StoreTransaction>,
    user: &CurrentUser,
) -> TrackerResult<String> {
    Ok(tx
        .find_user(user.id)
        .await?
        .map(|u| u.full_name)
        .unwrap_or_else(|| user.username.clone()))
}

/// Append a notice inside the running transaction
pub(crate) async fn notify(tx: &mut Box<dyn StoreTransaction>, notice: Notice) -> TrackerResult<()> {
    let kind = notice.kind;
    let recipient = notice.recipient();
    tx.insert_notification(notice.into_notification()).await?;
    tracing::debug!(?kind, recipient, "notice queued");
    Ok(())
}

pub(crate) fn not_found(entity: &'static str, id: Id) -> TrackerError {
    TrackerError::not_found(entity, id)
}
