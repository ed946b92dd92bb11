//! # Playback Error Types
//!
//! Errors raised by the streaming buffer and the playback coordinator.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    /// The decoder refused the track (unplayable, restricted, not logged in).
    #[error("Failed to load track: {reason}")]
    LoadFailed { reason: String },

    /// The decoder reported a failure while the track was streaming.
    #[error("Streaming failed: {reason}")]
    StreamFailed { reason: String },

    /// A newer load or a stop replaced this load while the decoder was busy.
    #[error("Load superseded by a newer request")]
    Superseded,

    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// The operation does not apply in the current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    // ========================================================================
    // Platform/Adapter Errors
    // ========================================================================
    /// A transport call on the decoder failed.
    #[error("Decoder error: {0}")]
    Bridge(#[from] BridgeError),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if the queue can carry on with the next track.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlaybackError::LoadFailed { .. }
                | PlaybackError::StreamFailed { .. }
                | PlaybackError::Bridge(_)
        )
    }

    /// Returns `true` if the track itself could not be started.
    pub fn is_load_error(&self) -> bool {
        matches!(self, PlaybackError::LoadFailed { .. })
    }

    /// Human-readable reason without the error prefix.
    pub fn reason(&self) -> String {
        match self {
            PlaybackError::LoadFailed { reason } | PlaybackError::StreamFailed { reason } => {
                reason.clone()
            }
            PlaybackError::Bridge(err) => err.reason(),
            other => other.to_string(),
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let load = PlaybackError::LoadFailed {
            reason: "region restricted".into(),
        };
        assert!(load.is_load_error());
        assert!(load.is_recoverable());
        assert_eq!(load.reason(), "region restricted");
        assert_eq!(load.to_string(), "Failed to load track: region restricted");

        assert!(!PlaybackError::Superseded.is_recoverable());
        assert!(!PlaybackError::InvalidOperation("x".into()).is_load_error());
    }

    #[test]
    fn test_bridge_error_converts() {
        let err: PlaybackError = BridgeError::OperationFailed("device lost".into()).into();
        assert!(matches!(err, PlaybackError::Bridge(_)));
        assert_eq!(err.reason(), "device lost");
    }
}
