//! # Streaming Buffer
//!
//! Byte accumulator sitting between the decoder callback (producer) and the
//! audio sink (consumer). One buffer exists per track load.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │    Decoder callback thread (Producer)   │
//! │    audio_data_arrived / complete        │
//! └────────────┬────────────────────────────┘
//!              │ append(&[u8])
//!              ▼
//! ┌─────────────────────────────────────────┐
//! │      StreamingBuffer (Shared, Arc)      │
//! │  BytesMut + read/write positions        │
//! └────────────┬────────────────────────────┘
//!              │ read(max)
//!              ▼
//! ┌─────────────────────────────────────────┐
//! │       Audio sink poll (Consumer)        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! Reads never block. When nothing new has arrived the consumer gets
//! [`ReadOutcome::Pending`]; end of stream is only reported once the
//! download is complete *and* every byte has been read.
//!
//! ## Usage
//!
//! ```rust
//! use core_playback::streaming::{Generation, ReadOutcome, StreamingBuffer};
//!
//! let buffer = StreamingBuffer::new(Generation::INITIAL.next());
//! buffer.append(b"abc");
//! buffer.mark_complete();
//!
//! assert!(matches!(buffer.read(2), ReadOutcome::Data(ref b) if &b[..] == b"ab"));
//! assert!(matches!(buffer.read(2), ReadOutcome::Data(ref b) if &b[..] == b"c"));
//! assert_eq!(buffer.read(2), ReadOutcome::EndOfStream);
//! ```

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{trace, warn};

// ============================================================================
// Generation
// ============================================================================

/// Identifies one track load. Every load and every stop moves to a new
/// generation; anything tagged with an older one is stale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Generation(pub u64);

impl Generation {
    pub const INITIAL: Generation = Generation(0);

    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// What happened to an append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The bytes were stored.
    Accepted(usize),
    /// The download was already marked complete; nothing was stored.
    AfterComplete,
    /// The buffer belongs to a load that has been replaced or stopped.
    Retired,
}

/// What a read produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Up to `max` unread bytes, in arrival order.
    Data(Bytes),
    /// Nothing unread yet, but more may still arrive.
    Pending,
    /// Download complete and fully drained, or the buffer was retired.
    EndOfStream,
}

// ============================================================================
// StreamingBuffer
// ============================================================================

#[derive(Default)]
struct BufferState {
    /// Unread bytes only; consumed data is split off on read.
    unread: BytesMut,
    written: usize,
    read_pos: usize,
    fully_downloaded: bool,
    retired: bool,
    anomalies: u64,
}

/// Cloneable handle to a single-producer/single-consumer byte buffer.
#[derive(Clone)]
pub struct StreamingBuffer {
    generation: Generation,
    state: Arc<Mutex<BufferState>>,
}

impl StreamingBuffer {
    pub fn new(generation: Generation) -> Self {
        Self {
            generation,
            state: Arc::new(Mutex::new(BufferState::default())),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Append bytes delivered by the decoder.
    pub fn append(&self, bytes: &[u8]) -> AppendOutcome {
        let mut state = self.state.lock();
        if state.retired {
            trace!(
                generation = %self.generation,
                bytes = bytes.len(),
                "Discarding audio for retired buffer"
            );
            return AppendOutcome::Retired;
        }
        if state.fully_downloaded {
            state.anomalies += 1;
            warn!(
                generation = %self.generation,
                bytes = bytes.len(),
                anomalies = state.anomalies,
                "Audio arrived after the stream was marked complete"
            );
            return AppendOutcome::AfterComplete;
        }

        state.unread.extend_from_slice(bytes);
        state.written += bytes.len();
        AppendOutcome::Accepted(bytes.len())
    }

    /// Read up to `max` unread bytes without blocking.
    pub fn read(&self, max: usize) -> ReadOutcome {
        let mut state = self.state.lock();
        if state.retired {
            return ReadOutcome::EndOfStream;
        }
        if state.unread.is_empty() {
            return if state.fully_downloaded {
                ReadOutcome::EndOfStream
            } else {
                ReadOutcome::Pending
            };
        }
        if max == 0 {
            return ReadOutcome::Pending;
        }

        let take = max.min(state.unread.len());
        let chunk = state.unread.split_to(take).freeze();
        state.read_pos += take;
        ReadOutcome::Data(chunk)
    }

    /// The producer has delivered everything. Idempotent.
    pub fn mark_complete(&self) {
        let mut state = self.state.lock();
        if !state.fully_downloaded {
            state.fully_downloaded = true;
            trace!(generation = %self.generation, written = state.written, "Stream complete");
        }
    }

    /// Detach the buffer from playback. Unread bytes are dropped, later
    /// appends are discarded and reads report end of stream.
    pub fn retire(&self) {
        let mut state = self.state.lock();
        if !state.retired {
            state.retired = true;
            state.unread.clear();
        }
    }

    pub fn is_retired(&self) -> bool {
        self.state.lock().retired
    }

    pub fn is_fully_downloaded(&self) -> bool {
        self.state.lock().fully_downloaded
    }

    /// Total bytes accepted so far.
    pub fn written(&self) -> usize {
        self.state.lock().written
    }

    /// Total bytes handed to the consumer so far.
    pub fn read_position(&self) -> usize {
        self.state.lock().read_pos
    }

    pub fn available(&self) -> usize {
        self.state.lock().unread.len()
    }

    /// Appends rejected because the stream was already complete.
    pub fn anomalies(&self) -> u64 {
        self.state.lock().anomalies
    }
}

impl fmt::Debug for StreamingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("StreamingBuffer")
            .field("generation", &self.generation)
            .field("written", &state.written)
            .field("read_pos", &state.read_pos)
            .field("fully_downloaded", &state.fully_downloaded)
            .field("retired", &state.retired)
            .finish()
    }
}
