//! # Playback & Streaming Module
//!
//! Transport control and audio handoff for the player.
//!
//! ## Overview
//!
//! This module handles:
//! - Buffering audio bytes pushed by the decoder until the sink pulls them
//! - The Idle/Loading/Playing/Paused state machine
//! - Detecting the end of a track so the play queue can advance
//! - Dropping audio that arrives for a track that is no longer current

pub mod coordinator;
pub mod error;
pub mod streaming;

pub use coordinator::{
    AudioPull, EndReason, PlaybackCoordinator, PlaybackStatus, PlayedTrack, TrackEnded,
    TransportOutcome,
};
pub use error::{PlaybackError, Result};
pub use streaming::{AppendOutcome, Generation, ReadOutcome, StreamingBuffer};
