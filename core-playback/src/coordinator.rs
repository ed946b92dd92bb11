//! # Playback Coordinator
//!
//! Owns the transport state of the player and the streaming buffer of the
//! current load. Three parties call into it concurrently:
//!
//! - the command thread (load, pause, stop, volume)
//! - the decoder callback thread (audio arriving, stream complete, errors)
//! - the audio sink polling for bytes
//!
//! ## State machine
//!
//! ```text
//!          load            decoder accepts
//!  Idle ─────────► Loading ───────────────► Playing ◄──► Paused
//!   ▲                 │ decoder refuses         │            │
//!   └─────────────────┴─────────────────────────┴────────────┘
//!             stop / end of track / stream error
//! ```
//!
//! Every load and every stop moves to a new [`Generation`] and retires the
//! previous buffer, so audio delivered late for an old track can never leak
//! into the next one.
//!
//! State lives behind one `parking_lot::Mutex`; it is never held while
//! calling the decoder or the announcer.

use crate::error::{PlaybackError, Result};
use crate::streaming::{AppendOutcome, Generation, ReadOutcome, StreamingBuffer};
use bridge_traits::{Announcer, BridgeError, Clock, DecoderSession};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use core_buffers::Track;
use core_runtime::config::{CoreConfig, PlaybackSettings};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

// ============================================================================
// Public types
// ============================================================================

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Playing,
    Paused,
}

/// Result of a play/pause request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportOutcome {
    Playing,
    Paused,
    /// Nothing is loaded; the request was ignored.
    NoTrack,
}

/// Why a track stopped on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Every byte was downloaded and played out.
    Completed,
    /// The decoder reported an error mid-stream.
    StreamError,
}

/// A track reached its end. The play queue uses this to advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackEnded {
    pub track: Arc<Track>,
    pub generation: Generation,
    pub reason: EndReason,
}

/// What the audio sink gets when it polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPull {
    Audio(Bytes),
    /// Playing, but no new audio has arrived yet.
    Buffering,
    Paused,
    Idle,
    /// The track just finished. Reported once per load.
    Ended(TrackEnded),
}

/// One entry of the playback history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayedTrack {
    pub track: Arc<Track>,
    pub finished_at: DateTime<Utc>,
    pub reason: EndReason,
}

// ============================================================================
// Internal state
// ============================================================================

struct CoordinatorState {
    status: PlaybackStatus,
    /// Set only once the decoder accepted the track.
    playing_track: Option<Arc<Track>>,
    /// Track handed to the decoder but not yet accepted.
    loading_track: Option<Arc<Track>>,
    volume: f32,
    history: VecDeque<PlayedTrack>,
    buffer: StreamingBuffer,
    generation: Generation,
}

/// What a halt interrupted.
struct Halted {
    track: Arc<Track>,
    /// The host was told `track` is playing and must be told it stopped.
    was_playing: bool,
}

impl CoordinatorState {
    /// Moves to `Idle`, retiring the buffer. Returns the track that was
    /// loading or playing, or `None` if already idle.
    fn halt(&mut self) -> Option<Halted> {
        if self.status == PlaybackStatus::Idle {
            return None;
        }
        self.generation = self.generation.next();
        self.buffer.retire();
        self.status = PlaybackStatus::Idle;
        let loading = self.loading_track.take();
        match self.playing_track.take() {
            Some(track) => Some(Halted {
                track,
                was_playing: true,
            }),
            None => loading.map(|track| Halted {
                track,
                was_playing: false,
            }),
        }
    }

    fn record_history(&mut self, entry: PlayedTrack, limit: Option<usize>) {
        self.history.push_back(entry);
        if let Some(limit) = limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    fn outcome(&self) -> TransportOutcome {
        match self.status {
            PlaybackStatus::Playing => TransportOutcome::Playing,
            PlaybackStatus::Paused => TransportOutcome::Paused,
            _ => TransportOutcome::NoTrack,
        }
    }
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

struct Inner {
    decoder: Arc<dyn DecoderSession>,
    announcer: Arc<dyn Announcer>,
    events: EventBus,
    clock: Arc<dyn Clock>,
    settings: PlaybackSettings,
    state: Mutex<CoordinatorState>,
}

// ============================================================================
// PlaybackCoordinator
// ============================================================================

/// Cloneable handle; all clones drive the same player.
#[derive(Clone)]
pub struct PlaybackCoordinator {
    inner: Arc<Inner>,
}

impl PlaybackCoordinator {
    pub fn new(
        decoder: Arc<dyn DecoderSession>,
        announcer: Arc<dyn Announcer>,
        events: EventBus,
        clock: Arc<dyn Clock>,
        settings: PlaybackSettings,
    ) -> Self {
        let generation = Generation::INITIAL;
        let buffer = StreamingBuffer::new(generation);
        buffer.retire();
        Self {
            inner: Arc::new(Inner {
                decoder,
                announcer,
                events,
                clock,
                settings,
                state: Mutex::new(CoordinatorState {
                    status: PlaybackStatus::Idle,
                    playing_track: None,
                    loading_track: None,
                    volume: clamp_volume(settings.initial_volume),
                    history: VecDeque::new(),
                    buffer,
                    generation,
                }),
            }),
        }
    }

    /// Wires the coordinator from the bridges and settings in `config`.
    pub fn from_config(config: &CoreConfig, events: EventBus) -> Self {
        Self::new(
            Arc::clone(&config.decoder),
            Arc::clone(&config.announcer),
            events,
            Arc::clone(&config.clock),
            config.settings.playback,
        )
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    /// Start playing `track`, stopping whatever was active first.
    ///
    /// # Errors
    ///
    /// - `LoadFailed` if the decoder refuses the track; the coordinator is
    ///   left idle and the track is never reported as playing
    /// - `Superseded` if a stop or another load replaced this one while the
    ///   decoder was busy
    pub fn load(&self, track: Arc<Track>) -> Result<()> {
        let (previous, generation) = {
            let mut state = self.inner.state.lock();
            let previous = state.halt();
            state.generation = state.generation.next();
            state.buffer = StreamingBuffer::new(state.generation);
            state.status = PlaybackStatus::Loading;
            state.loading_track = Some(Arc::clone(&track));
            (previous, state.generation)
        };
        let displaced = previous.as_ref().map_or(false, |halted| halted.was_playing);
        if let Some(previous) = &previous {
            self.finish_halt(&previous.track);
        }

        info!(track_id = %track.id, %generation, "Loading track");
        self.emit(PlaybackEvent::Loading {
            track_id: track.id.to_string(),
            title: track.title.clone(),
        });

        let result = self.start_decoder(&track, generation);

        let mut state = self.inner.state.lock();
        if state.generation != generation {
            let stopped = state.status == PlaybackStatus::Idle;
            drop(state);
            debug!(track_id = %track.id, %generation, "Load superseded");
            // A concurrent stop already unloaded, but the decoder may have
            // accepted the track after that.
            if result.is_ok() && stopped {
                self.inner.decoder.unload();
            }
            // Nobody else clears the display when the replacement left
            // nothing playing.
            if displaced && stopped {
                self.publish_track_changed(None);
            }
            return Err(PlaybackError::Superseded);
        }

        match result {
            Ok(()) => {
                state.status = PlaybackStatus::Playing;
                state.loading_track = None;
                state.playing_track = Some(Arc::clone(&track));
                drop(state);

                info!(track_id = %track.id, %generation, "Playback started");
                self.publish_track_changed(Some(&track));
                self.emit(PlaybackEvent::Started {
                    track_id: track.id.to_string(),
                    title: track.title.clone(),
                });
                Ok(())
            }
            Err(err) => {
                state.status = PlaybackStatus::Idle;
                state.loading_track = None;
                state.buffer.retire();
                drop(state);

                let reason = err.reason();
                warn!(track_id = %track.id, %reason, "Decoder refused track");
                if displaced {
                    self.publish_track_changed(None);
                }
                self.emit(PlaybackEvent::LoadFailed {
                    track_id: track.id.to_string(),
                    reason: reason.clone(),
                });
                Err(PlaybackError::LoadFailed { reason })
            }
        }
    }

    fn start_decoder(
        &self,
        track: &Track,
        generation: Generation,
    ) -> std::result::Result<(), BridgeError> {
        let decoder = &self.inner.decoder;
        decoder.load_track(&track.to_request().with_generation(generation.value()))?;
        if let Err(err) = decoder.transport_play() {
            decoder.unload();
            return Err(err);
        }
        Ok(())
    }

    /// Resume a paused track. Ignored unless a track is loaded.
    pub fn play(&self) -> Result<TransportOutcome> {
        let (track, generation) = {
            let state = self.inner.state.lock();
            match (state.status, &state.playing_track) {
                (PlaybackStatus::Paused, Some(track)) => (Arc::clone(track), state.generation),
                _ => return Ok(state.outcome()),
            }
        };

        self.inner.decoder.transport_play()?;

        let mut state = self.inner.state.lock();
        if state.generation == generation && state.status == PlaybackStatus::Paused {
            state.status = PlaybackStatus::Playing;
            drop(state);
            debug!(track_id = %track.id, "Resumed");
            self.emit(PlaybackEvent::Resumed {
                track_id: track.id.to_string(),
            });
            return Ok(TransportOutcome::Playing);
        }
        Ok(state.outcome())
    }

    /// Pause the playing track. Buffered audio is kept.
    pub fn pause(&self) -> Result<TransportOutcome> {
        let (track, generation) = {
            let state = self.inner.state.lock();
            match (state.status, &state.playing_track) {
                (PlaybackStatus::Playing, Some(track)) => (Arc::clone(track), state.generation),
                _ => return Ok(state.outcome()),
            }
        };

        self.inner.decoder.transport_pause()?;

        let mut state = self.inner.state.lock();
        if state.generation == generation && state.status == PlaybackStatus::Playing {
            state.status = PlaybackStatus::Paused;
            drop(state);
            debug!(track_id = %track.id, "Paused");
            self.emit(PlaybackEvent::Paused {
                track_id: track.id.to_string(),
            });
            return Ok(TransportOutcome::Paused);
        }
        Ok(state.outcome())
    }

    pub fn toggle_pause(&self) -> Result<TransportOutcome> {
        match self.status() {
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Paused => self.play(),
            _ => Ok(TransportOutcome::NoTrack),
        }
    }

    /// Stop and unload. No-op when already idle.
    pub fn stop(&self) {
        let halted = self.inner.state.lock().halt();
        if let Some(halted) = halted {
            self.finish_halt(&halted.track);
            if halted.was_playing {
                self.publish_track_changed(None);
            }
        }
    }

    /// Side effects of a halt that must run outside the lock.
    fn finish_halt(&self, track: &Track) {
        self.inner.decoder.unload();
        info!(track_id = %track.id, "Playback stopped");
        self.emit(PlaybackEvent::Stopped {
            track_id: track.id.to_string(),
        });
    }

    // ------------------------------------------------------------------
    // Volume
    // ------------------------------------------------------------------

    pub fn volume_up(&self, delta: f32) -> f32 {
        self.adjust_volume(|volume| volume + delta)
    }

    pub fn volume_down(&self, delta: f32) -> f32 {
        self.adjust_volume(|volume| volume - delta)
    }

    pub fn set_volume(&self, volume: f32) -> f32 {
        self.adjust_volume(|_| volume)
    }

    fn adjust_volume<F>(&self, adjust: F) -> f32
    where
        F: FnOnce(f32) -> f32,
    {
        let volume = {
            let mut state = self.inner.state.lock();
            state.volume = clamp_volume(adjust(state.volume));
            state.volume
        };
        debug!(volume, "Volume changed");
        self.emit(PlaybackEvent::VolumeChanged {
            volume_percent: (volume * 100.0).round() as u8,
        });
        volume
    }

    // ------------------------------------------------------------------
    // Decoder callbacks
    // ------------------------------------------------------------------

    /// Audio for whatever is currently loaded.
    pub fn audio_data_arrived(&self, bytes: &[u8]) -> AppendOutcome {
        let buffer = self.inner.state.lock().buffer.clone();
        buffer.append(bytes)
    }

    /// Audio tagged with the load it belongs to. Stale generations are
    /// dropped without touching the current buffer.
    pub fn audio_data_arrived_for(&self, generation: Generation, bytes: &[u8]) -> AppendOutcome {
        let buffer = {
            let state = self.inner.state.lock();
            if state.generation != generation {
                trace!(
                    %generation,
                    current = %state.generation,
                    bytes = bytes.len(),
                    "Dropping audio for stale load"
                );
                return AppendOutcome::Retired;
            }
            state.buffer.clone()
        };
        buffer.append(bytes)
    }

    /// The decoder finished downloading. Playback continues until the
    /// buffer drains.
    pub fn audio_stream_complete(&self) {
        self.complete_stream(None);
    }

    /// Completion tagged with the load it belongs to. A stale generation is
    /// ignored so it cannot end the track that replaced it. Returns whether
    /// the signal was applied.
    pub fn audio_stream_complete_for(&self, generation: Generation) -> bool {
        self.complete_stream(Some(generation))
    }

    fn complete_stream(&self, expected: Option<Generation>) -> bool {
        let (buffer, active) = {
            let state = self.inner.state.lock();
            if let Some(generation) = expected.filter(|g| *g != state.generation) {
                debug!(%generation, current = %state.generation, "Ignoring completion for stale load");
                return false;
            }
            (state.buffer.clone(), state.status != PlaybackStatus::Idle)
        };
        buffer.mark_complete();
        if active {
            debug!(generation = %buffer.generation(), written = buffer.written(), "Download complete");
            self.inner.decoder.unload();
        }
        true
    }

    /// The decoder failed mid-stream. Stops playback and reports the end
    /// of the track so the queue can move on. Returns `None` when nothing
    /// was playing.
    pub fn stream_error(&self, reason: &str) -> Option<TrackEnded> {
        self.fail_stream(None, reason)
    }

    /// Stream error tagged with the load it belongs to. A stale generation
    /// is ignored and leaves the current track playing.
    pub fn stream_error_for(&self, generation: Generation, reason: &str) -> Option<TrackEnded> {
        self.fail_stream(Some(generation), reason)
    }

    fn fail_stream(&self, expected: Option<Generation>, reason: &str) -> Option<TrackEnded> {
        let now = self.inner.clock.now();
        let (halted, generation) = {
            let mut state = self.inner.state.lock();
            let generation = state.generation;
            if let Some(stale) = expected.filter(|g| *g != generation) {
                drop(state);
                debug!(generation = %stale, current = %generation, %reason, "Ignoring stream error for stale load");
                return None;
            }
            let Some(halted) = state.halt() else {
                drop(state);
                warn!(%reason, "Stream error while idle");
                return None;
            };
            state.record_history(
                PlayedTrack {
                    track: Arc::clone(&halted.track),
                    finished_at: now,
                    reason: EndReason::StreamError,
                },
                self.inner.settings.history_limit,
            );
            (halted, generation)
        };
        let track = halted.track;

        warn!(track_id = %track.id, %generation, %reason, "Streaming error");
        self.emit(PlaybackEvent::Error {
            track_id: Some(track.id.to_string()),
            message: reason.to_string(),
            recoverable: true,
        });
        self.inner
            .announcer
            .announce(&format!("Streaming error: {}", reason), true);

        self.finish_halt(&track);
        if halted.was_playing {
            self.publish_track_changed(None);
        }

        Some(TrackEnded {
            track,
            generation,
            reason: EndReason::StreamError,
        })
    }

    // ------------------------------------------------------------------
    // Audio sink
    // ------------------------------------------------------------------

    /// Poll for up to `max` bytes of audio.
    pub fn pull_audio(&self, max: usize) -> AudioPull {
        let (status, buffer, generation) = {
            let state = self.inner.state.lock();
            (state.status, state.buffer.clone(), state.generation)
        };
        match status {
            PlaybackStatus::Idle => AudioPull::Idle,
            PlaybackStatus::Loading => AudioPull::Buffering,
            PlaybackStatus::Paused => AudioPull::Paused,
            PlaybackStatus::Playing => match buffer.read(max) {
                ReadOutcome::Data(bytes) => AudioPull::Audio(bytes),
                ReadOutcome::Pending => AudioPull::Buffering,
                ReadOutcome::EndOfStream => self.finish_track(generation),
            },
        }
    }

    fn finish_track(&self, generation: Generation) -> AudioPull {
        let now = self.inner.clock.now();
        let track = {
            let mut state = self.inner.state.lock();
            match state.status {
                PlaybackStatus::Playing if state.generation == generation => {}
                PlaybackStatus::Paused => return AudioPull::Paused,
                _ => return AudioPull::Idle,
            }
            let Some(track) = state.playing_track.take() else {
                error!(%generation, "Playing without a track");
                debug_assert!(false, "playing status without a playing track");
                state.status = PlaybackStatus::Idle;
                return AudioPull::Idle;
            };
            state.status = PlaybackStatus::Idle;
            state.record_history(
                PlayedTrack {
                    track: Arc::clone(&track),
                    finished_at: now,
                    reason: EndReason::Completed,
                },
                self.inner.settings.history_limit,
            );
            track
        };

        info!(track_id = %track.id, %generation, "Track completed");
        self.emit(PlaybackEvent::Completed {
            track_id: track.id.to_string(),
        });
        self.publish_track_changed(None);

        AudioPull::Ended(TrackEnded {
            track,
            generation,
            reason: EndReason::Completed,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn status(&self) -> PlaybackStatus {
        self.inner.state.lock().status
    }

    pub fn is_paused(&self) -> bool {
        self.status() == PlaybackStatus::Paused
    }

    /// The track the decoder accepted, if any.
    pub fn playing_track(&self) -> Option<Arc<Track>> {
        self.inner.state.lock().playing_track.clone()
    }

    pub fn volume(&self) -> f32 {
        self.inner.state.lock().volume
    }

    pub fn volume_step(&self) -> f32 {
        self.inner.settings.volume_step
    }

    /// Oldest first.
    pub fn history(&self) -> Vec<PlayedTrack> {
        self.inner.state.lock().history.iter().cloned().collect()
    }

    pub fn generation(&self) -> Generation {
        self.inner.state.lock().generation
    }

    /// Buffer of the current load.
    pub fn current_buffer(&self) -> StreamingBuffer {
        self.inner.state.lock().buffer.clone()
    }

    pub fn now_playing_announcement(&self) -> Option<String> {
        self.playing_track().map(|track| track.announcement())
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    fn emit(&self, event: PlaybackEvent) {
        self.inner.events.emit(CoreEvent::Playback(event)).ok();
    }

    fn publish_track_changed(&self, track: Option<&Track>) {
        self.emit(PlaybackEvent::TrackChanged {
            track_id: track.map(|track| track.id.to_string()),
            title: track.map(|track| track.title.clone()),
        });
        let display = track.map(Track::display_text);
        self.inner.announcer.notify_track_changed(display.as_deref());
    }
}

impl fmt::Debug for PlaybackCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("PlaybackCoordinator")
            .field("status", &state.status)
            .field(
                "playing_track",
                &state.playing_track.as_ref().map(|track| &track.id),
            )
            .field("volume", &state.volume)
            .field("generation", &state.generation)
            .finish()
    }
}
