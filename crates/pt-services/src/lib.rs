//! # pt-services
//!
//! The Project Tracker engine. [`Tracker`] is the single entry point used by
//! the HTTP layer and by any other front end: every operation takes the
//! caller's [`pt_auth::RequestContext`] and returns a
//! [`pt_core::result::TrackerResult`].
//!
//! - Reads are scoped by role; ids outside the caller's scope are `NotFound`
//! - Mutations run in one store transaction together with the notifications
//!   they emit
//! - Task and lead transitions lock their row first

pub mod documents;
pub mod exports;
pub mod leads;
pub mod messages;
pub mod notifications;
pub mod projects;
pub mod scoping;
pub mod seed;
pub mod tasks;
pub mod tracker;
pub mod users;

mod validation;

#[cfg(test)]
mod testing;

pub use documents::Download;
pub use leads::Attachment;
pub use projects::ProjectDetail;
pub use pt_exports::{ExportKind, ExportedFile};
pub use seed::SeedReport;
pub use tracker::Tracker;
pub use users::LoginOutcome;
