use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// The operation is not allowed on this buffer (e.g. dismissing the play queue).
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Buffer not found: {0}")]
    NotFound(String),

    #[error("Index {index} out of range for buffer of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl BufferError {
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, BufferError::InvalidOperation(_))
    }
}

pub type Result<T> = std::result::Result<T, BufferError>;
