//! Error types for player state management

use thiserror::Error;

/// Player errors
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Queue selection points past the end of the queue
    #[error("Index out of range: {index} (queue length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Episode catalog could not be parsed
    #[error("Invalid catalog: {0}")]
    Catalog(String),
}

impl From<serde_json::Error> for PlayerError {
    fn from(err: serde_json::Error) -> Self {
        PlayerError::Catalog(err.to_string())
    }
}

/// Result type for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;
