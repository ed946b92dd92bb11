//! Decoder session bridge.
//!
//! The streaming/decoding library is a black box owned by the host. The core
//! talks to it through [`DecoderSession`] (outbound commands) and receives its
//! callbacks through plain method calls on the playback coordinator
//! (`audio_data_arrived`, `audio_stream_complete`, `stream_error`).
//!
//! All methods are synchronous: the decoder accepts or rejects a load
//! immediately and then pushes audio on its own thread.

use crate::{error::Result, platform::PlatformSendSync};

/// What the decoder needs to start streaming a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRequest {
    /// Backend-specific track identifier (usually a URI).
    pub track_id: String,
    /// Title, for host-side diagnostics only.
    pub title: String,
    /// Load token. Echo it back through the `*_for` callbacks so late
    /// signals from a replaced load are ignored.
    pub generation: u64,
}

impl TrackRequest {
    pub fn new(track_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            title: title.into(),
            generation: 0,
        }
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}

/// Outbound half of the decoder boundary.
///
/// # Contract
///
/// - `load_track` returns `Err` if the backend refuses the track (unplayable,
///   region-restricted, not logged in). The core treats that as a load error
///   and never marks the track as playing.
/// - After `unload` the decoder should stop delivering audio for the previous
///   track. Late deliveries are tolerated by the core.
/// - `transport_play`/`transport_pause` toggle the decoder's own pull loop.
///
/// # Example
///
/// ```
/// use bridge_traits::playback::{DecoderSession, TrackRequest};
/// use bridge_traits::error::Result;
///
/// struct SilentDecoder;
///
/// impl DecoderSession for SilentDecoder {
///     fn load_track(&self, _track: &TrackRequest) -> Result<()> { Ok(()) }
///     fn unload(&self) {}
///     fn transport_play(&self) -> Result<()> { Ok(()) }
///     fn transport_pause(&self) -> Result<()> { Ok(()) }
/// }
/// ```
pub trait DecoderSession: PlatformSendSync {
    /// Ask the backend to begin streaming `track`.
    fn load_track(&self, track: &TrackRequest) -> Result<()>;

    /// Release the currently loaded track.
    fn unload(&self);

    fn transport_play(&self) -> Result<()>;

    fn transport_pause(&self) -> Result<()>;
}
