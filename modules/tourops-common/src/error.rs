use thiserror::Error;

#[derive(Error, Debug)]
pub enum TourOpsError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Saving a schedule failed. The caller keeps its in-memory copy and may retry.
    #[error("Failed to save schedule: {0}")]
    Persistence(String),

    #[error("Schedule is locked: request edit mode before changing it")]
    ScheduleLocked,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl TourOpsError {
    /// Whether the user can reasonably try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TourOpsError::Persistence(_) | TourOpsError::Http(_))
    }
}
