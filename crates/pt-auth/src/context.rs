//! Request identity
//!
//! Every engine call receives a `RequestContext` explicitly; there is no
//! ambient session state.

use pt_core::error::TrackerError;
use pt_core::traits::Id;
use pt_core::types::Role;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: Id,
    pub username: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(id: Id, username: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            username: username.into(),
            role,
        }
    }

    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    pub fn is_customer(&self) -> bool {
        self.role == Role::Customer
    }
}

impl From<&pt_models::User> for CurrentUser {
    fn from(user: &pt_models::User) -> Self {
        Self::new(user.id, user.username.clone(), user.role)
    }
}

/// Identity presented with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestContext {
    Anonymous,
    Authenticated(CurrentUser),
}

impl RequestContext {
    pub fn user(user: CurrentUser) -> Self {
        Self::Authenticated(user)
    }

    /// The caller, or `Unauthenticated`
    pub fn require(&self) -> Result<&CurrentUser, TrackerError> {
        match self {
            Self::Authenticated(user) => Ok(user),
            Self::Anonymous => Err(TrackerError::Unauthenticated),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl From<CurrentUser> for RequestContext {
    fn from(user: CurrentUser) -> Self {
        Self::Authenticated(user)
    }
}
