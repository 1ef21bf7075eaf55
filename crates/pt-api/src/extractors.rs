//! Axum extractors for API handlers

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use pt_auth::{extract_bearer_token, RequestContext};
use pt_services::Tracker;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Tracker>,
}

impl AppState {
    pub fn new(tracker: Arc<Tracker>) -> Self {
        Self { tracker }
    }
}

/// Caller identity taken from the `Authorization: Bearer` header.
///
/// A request without the header is anonymous and the engine decides what
/// an anonymous caller may do. A header that does not carry a valid token
/// is rejected here.
pub struct Auth(pub RequestContext);

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(Auth(RequestContext::Anonymous));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::unauthorized("Expected a Bearer token"))?;

        let app_state = AppState::from_ref(state);
        let ctx = app_state
            .tracker
            .authenticate(token)
            .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;
        Ok(Auth(ctx))
    }
}

impl std::ops::Deref for Auth {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
