/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Player error: {0}")]
    Player(#[from] podcastr_playback::PlayerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
