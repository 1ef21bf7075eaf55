//! # pt-api
//!
//! JSON API for Project Tracker.
//!
//! Handlers are thin: they extract the caller's [`pt_auth::RequestContext`]
//! from the Bearer token, call one [`pt_services::Tracker`] operation and
//! map its error kind to an HTTP status.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::AppState;
pub use routes::router;
