//! Repository errors

use pt_core::error::TrackerError;
use pt_core::types::UnknownCode;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A stored value could not be mapped back into the domain model
    #[error("Corrupt row: {0}")]
    Decode(#[from] UnknownCode),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

impl From<RepositoryError> for TrackerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => TrackerError::not_found(entity, id),
            RepositoryError::Conflict(message) => TrackerError::invalid_state(message),
            RepositoryError::Database(e) => {
                tracing::warn!(error = %e, "database failure");
                TrackerError::Database(e.to_string())
            }
            RepositoryError::Decode(e) => TrackerError::Database(e.to_string()),
        }
    }
}
