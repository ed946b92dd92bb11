use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// The request does not make sense in the current state, e.g. picking
    /// a queue entry that does not exist.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Buffer error: {0}")]
    Buffer(#[from] core_buffers::BufferError),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),
}

impl CoreError {
    pub fn is_invalid_operation(&self) -> bool {
        match self {
            CoreError::InvalidOperation(_) => true,
            CoreError::Buffer(err) => err.is_invalid_operation(),
            CoreError::Playback(err) => {
                matches!(err, core_playback::PlaybackError::InvalidOperation(_))
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
