use pt_core::error::TrackerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export buffer could not be flushed: {0}")]
    Flush(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

impl From<ExportError> for TrackerError {
    fn from(err: ExportError) -> Self {
        TrackerError::Internal(err.to_string())
    }
}
