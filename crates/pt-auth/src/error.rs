//! Authentication errors

use pt_core::error::TrackerError;
use thiserror::Error;

use crate::jwt::JwtError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Required,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => Self::TokenExpired,
            JwtError::Invalid(_) => Self::InvalidCredentials,
            JwtError::EncodingFailed(msg) => Self::Internal(msg),
        }
    }
}

impl From<AuthError> for TrackerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Required | AuthError::InvalidCredentials | AuthError::TokenExpired => {
                TrackerError::Unauthenticated
            }
            AuthError::Hashing(msg) | AuthError::Internal(msg) => TrackerError::Internal(msg),
        }
    }
}
