use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The decoder refused a track (region restriction, unplayable, etc.).
    #[error("Track rejected: {0}")]
    Rejected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Human-readable reason without the variant prefix, suitable for speech.
    pub fn reason(&self) -> String {
        match self {
            BridgeError::NotAvailable(msg)
            | BridgeError::OperationFailed(msg)
            | BridgeError::Rejected(msg) => msg.clone(),
            BridgeError::Io(err) => err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
