//! # Play Queue Controller
//!
//! Owns every mutation of the play queue and decides what plays next.
//!
//! Queue index 0 is the track that is playing, or about to play. When the
//! coordinator reports the end of a track, the head is removed and the new
//! head is loaded.
//!
//! ## Locking
//!
//! Order is gate, then collection, then coordinator. The collection lock is
//! always released before the coordinator is called, since a load calls out
//! to the decoder.

use crate::error::{CoreError, Result};
use crate::messages;
use bridge_traits::Announcer;
use core_buffers::{BufferItem, BufferListCollection, Track};
use core_playback::{PlaybackCoordinator, PlaybackError, PlaybackStatus, TrackEnded};
use core_runtime::config::QueuePolicy;
use core_runtime::events::{CoreEvent, EventBus, QueueEvent};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct PlayQueueController {
    buffers: Arc<RwLock<BufferListCollection>>,
    coordinator: PlaybackCoordinator,
    announcer: Arc<dyn Announcer>,
    events: EventBus,
    policy: QueuePolicy,
    gate: Mutex<()>,
}

impl PlayQueueController {
    pub fn new(
        buffers: Arc<RwLock<BufferListCollection>>,
        coordinator: PlaybackCoordinator,
        announcer: Arc<dyn Announcer>,
        events: EventBus,
        policy: QueuePolicy,
    ) -> Self {
        Self {
            buffers,
            coordinator,
            announcer,
            events,
            policy,
            gate: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> QueuePolicy {
        self.policy
    }

    /// Tracks currently queued, head first.
    pub fn tracks(&self) -> Vec<Arc<Track>> {
        self.buffers
            .read()
            .play_queue()
            .items()
            .iter()
            .filter_map(|item| item.as_track().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buffers.read().play_queue().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `track`. Does not start playback. Returns its position.
    pub fn enqueue(&self, track: Arc<Track>) -> usize {
        let _gate = self.gate.lock();
        let track_id = track.id.to_string();
        let position = self
            .buffers
            .write()
            .play_queue_mut()
            .add(BufferItem::track(track));
        debug!(%track_id, position, "Enqueued");
        self.emit(QueueEvent::Enqueued { track_id, position });
        position
    }

    /// Queue `track` right after the head so it plays next. On an empty
    /// queue it becomes the head but is not loaded.
    pub fn enqueue_next(&self, track: Arc<Track>) -> usize {
        let _gate = self.gate.lock();
        let track_id = track.id.to_string();
        let position = {
            let mut buffers = self.buffers.write();
            let queue = buffers.play_queue_mut();
            let index = if queue.is_empty() { 0 } else { 1 };
            queue.insert(index, BufferItem::track(track))
        };
        debug!(%track_id, position, "Enqueued next");
        self.emit(QueueEvent::Enqueued { track_id, position });
        position
    }

    /// Advance past a finished track and load the next one.
    ///
    /// The head is only removed if it is the track that ended. If the user
    /// already changed the queue, it is left alone, and so is whatever the
    /// user started playing. Returns the track now playing, if any.
    pub fn handle_end_of_track(&self, ended: &TrackEnded) -> Result<Option<Arc<Track>>> {
        let _gate = self.gate.lock();
        let head_matches = {
            let mut buffers = self.buffers.write();
            let queue = buffers.play_queue_mut();
            let head_matches = queue
                .get(0)
                .and_then(BufferItem::as_track)
                .map_or(false, |head| head.id == ended.track.id);
            if head_matches {
                queue.remove_at(0);
            } else {
                warn!(
                    track_id = %ended.track.id,
                    generation = %ended.generation,
                    "Ended track is not at the queue head; leaving queue untouched"
                );
            }
            head_matches
        };
        if !head_matches && self.coordinator.status() != PlaybackStatus::Idle {
            return Ok(self.coordinator.playing_track());
        }
        self.load_head()
    }

    /// Play queue entry `index`, dropping everything before it.
    pub fn pick_from_queue(&self, index: usize) -> Result<Option<Arc<Track>>> {
        let _gate = self.gate.lock();
        {
            let mut buffers = self.buffers.write();
            let queue = buffers.play_queue_mut();
            match queue.get(index) {
                None => {
                    return Err(CoreError::InvalidOperation(format!(
                        "No queue entry at index {} (queue has {})",
                        index,
                        queue.len()
                    )))
                }
                Some(item) if !item.is_playable() => {
                    return Err(CoreError::InvalidOperation(format!(
                        "Queue entry {} is not a track",
                        index
                    )))
                }
                Some(_) => {}
            }
            let dropped = queue.remove_range(0, index);
            debug!(index, dropped = dropped.len(), "Picked from queue");
        }
        self.load_head()
    }

    /// Replace the whole queue with `track` and play it.
    pub fn play_now(&self, track: Arc<Track>) -> Result<Option<Arc<Track>>> {
        let _gate = self.gate.lock();
        let track_id = track.id.to_string();
        {
            let mut buffers = self.buffers.write();
            let queue = buffers.play_queue_mut();
            queue.clear();
            queue.add(BufferItem::track(track));
        }
        self.emit(QueueEvent::Replaced { track_id });
        self.load_head()
    }

    /// Load whatever is at the head of the queue.
    pub fn start_head(&self) -> Result<Option<Arc<Track>>> {
        let _gate = self.gate.lock();
        self.load_head()
    }

    /// Caller must hold the gate.
    fn load_head(&self) -> Result<Option<Arc<Track>>> {
        let mut skipped = 0u32;
        loop {
            let head = {
                let mut buffers = self.buffers.write();
                let queue = buffers.play_queue_mut();
                match queue.get(0).map(|item| item.as_track().cloned()) {
                    None => None,
                    Some(Some(track)) => Some(track),
                    Some(None) => {
                        warn!("Dropping non-track entry at the queue head");
                        queue.remove_at(0);
                        continue;
                    }
                }
            };

            let Some(track) = head else {
                info!("Play queue exhausted");
                self.emit(QueueEvent::Exhausted);
                return Ok(None);
            };

            match self.coordinator.load(Arc::clone(&track)) {
                Ok(()) => {
                    let remaining = {
                        let mut buffers = self.buffers.write();
                        let queue = buffers.play_queue_mut();
                        queue.set_current_index(0);
                        queue.len()
                    };
                    info!(track_id = %track.id, remaining, "Queue advanced");
                    self.emit(QueueEvent::Advanced {
                        track_id: track.id.to_string(),
                        remaining,
                    });
                    return Ok(Some(track));
                }
                Err(PlaybackError::Superseded) => {
                    debug!(track_id = %track.id, "Queue load superseded");
                    return Ok(None);
                }
                Err(err) if err.is_load_error() && self.policy.skip_unplayable => {
                    skipped += 1;
                    let reason = err.reason();
                    self.buffers.write().play_queue_mut().remove_at(0);
                    warn!(track_id = %track.id, %reason, skipped, "Skipping unplayable track");
                    self.emit(QueueEvent::Skipped {
                        track_id: track.id.to_string(),
                        reason,
                    });
                    if skipped >= self.policy.max_consecutive_skips {
                        warn!(skipped, "Too many unplayable tracks in a row");
                        self.emit(QueueEvent::SkipLimitReached { skipped });
                        self.announcer
                            .announce(&messages::skipped_unplayable(skipped), true);
                        return Ok(None);
                    }
                }
                Err(err) => {
                    self.announcer
                        .announce(&messages::unable_to_play(&err.reason()), true);
                    return Err(err.into());
                }
            }
        }
    }

    fn emit(&self, event: QueueEvent) {
        self.events.emit(CoreEvent::Queue(event)).ok();
    }
}
