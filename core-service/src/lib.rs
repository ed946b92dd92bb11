//! Core service façade.
//!
//! Wires the host-provided bridges from a [`CoreConfig`] into the buffer
//! collection, the playback coordinator and the play queue, and exposes the
//! named user commands the host binds to hotkeys.
//!
//! Decoder callbacks (`audio_data_arrived`, `audio_stream_complete`,
//! `stream_error`) and the audio sink (`pull_audio`) go through the service
//! as well, so the end of a track advances the queue automatically.

pub mod commands;
pub mod error;
pub mod messages;
pub mod queue;

pub use commands::Command;
pub use error::{CoreError, Result};
pub use queue::PlayQueueController;

use bridge_traits::{Announcer, SearchSession};
use core_buffers::{
    BufferId, BufferItem, BufferList, BufferListCollection, Navigation, Playlist, SearchHit,
    Track,
};
use core_playback::{
    AppendOutcome, AudioPull, Generation, PlaybackCoordinator, PlaybackStatus, TrackEnded,
    TransportOutcome,
};
use core_runtime::config::{CoreConfig, CoreSettings};
use core_runtime::events::{BufferEvent, CoreEvent, EventBus, EventStream};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which end of a list a movement heads for; picks the boundary cue.
#[derive(Clone, Copy)]
enum Edge {
    Top,
    Bottom,
}

/// Serializable view of the service state for host status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceSnapshot {
    pub buffers: Vec<BufferSummary>,
    pub current_buffer: usize,
    /// Track ids in the play queue, head first.
    pub queue: Vec<String>,
    pub status: PlaybackStatus,
    pub playing: Option<String>,
    pub volume: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferSummary {
    pub name: String,
    pub len: usize,
    pub current_index: Option<usize>,
    pub dismissable: bool,
}

/// Primary façade exposed to host applications.
pub struct CoreService {
    buffers: Arc<RwLock<BufferListCollection>>,
    coordinator: PlaybackCoordinator,
    queue: PlayQueueController,
    announcer: Arc<dyn Announcer>,
    events: EventBus,
    settings: CoreSettings,
    playlists_id: BufferId,
}

impl CoreService {
    /// Build the service. Starts with the Playlists buffer selected and an
    /// empty play queue.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;
        let settings = config.settings;
        let jump_size = settings.navigation.jump_size;
        let events = EventBus::new(config.event_buffer_size);

        let playlists =
            BufferList::new(messages::PLAYLISTS_BUFFER, false).with_jump_size(jump_size);
        let play_queue =
            BufferList::new(messages::PLAY_QUEUE_BUFFER, false).with_jump_size(jump_size);
        let playlists_id = playlists.id();
        let queue_id = play_queue.id();
        let buffers = Arc::new(RwLock::new(BufferListCollection::with_lists(
            vec![playlists, play_queue],
            queue_id,
        )?));

        let coordinator = PlaybackCoordinator::from_config(&config, events.clone());
        let queue = PlayQueueController::new(
            Arc::clone(&buffers),
            coordinator.clone(),
            Arc::clone(&config.announcer),
            events.clone(),
            settings.queue,
        );

        info!(jump_size, "Core service initialized");
        Ok(Self {
            buffers,
            coordinator,
            queue,
            announcer: config.announcer,
            events,
            settings,
            playlists_id,
        })
    }

    pub fn coordinator(&self) -> &PlaybackCoordinator {
        &self.coordinator
    }

    pub fn queue(&self) -> &PlayQueueController {
        &self.queue
    }

    pub fn settings(&self) -> &CoreSettings {
        &self.settings
    }

    /// Read-only access to the buffer collection.
    pub fn with_buffers<R>(&self, f: impl FnOnce(&BufferListCollection) -> R) -> R {
        f(&*self.buffers.read())
    }

    pub fn subscribe_events(&self) -> EventStream {
        EventStream::new(self.events.subscribe())
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    pub fn execute(&self, command: Command) -> Result<()> {
        debug!(%command, "Executing command");
        match command {
            Command::NextBuffer => self.switch_list(BufferListCollection::next_list),
            Command::PreviousBuffer => self.switch_list(BufferListCollection::previous_list),
            Command::NextBufferItem => self.navigate_item(Edge::Bottom, BufferList::next_item),
            Command::PreviousBufferItem => {
                self.navigate_item(Edge::Top, BufferList::previous_item)
            }
            Command::FirstBufferItem => self.navigate_item(Edge::Top, BufferList::first_item),
            Command::LastBufferItem => self.navigate_item(Edge::Bottom, BufferList::last_item),
            Command::NextBufferItemJump => {
                self.navigate_item(Edge::Bottom, BufferList::next_jump)
            }
            Command::PreviousBufferItemJump => {
                self.navigate_item(Edge::Top, BufferList::previous_jump)
            }
            Command::ActivateBufferItem => self.activate_current_item(),
            Command::PlaybackVolumeUp => {
                self.coordinator
                    .volume_up(self.settings.playback.volume_step);
                self.announce(messages::LOUDER);
                Ok(())
            }
            Command::PlaybackVolumeDown => {
                self.coordinator
                    .volume_down(self.settings.playback.volume_step);
                self.announce(messages::QUIETER);
                Ok(())
            }
            Command::DismissBuffer => self.dismiss_current_buffer(),
            Command::AnnounceNowPlaying => {
                let text = self
                    .coordinator
                    .now_playing_announcement()
                    .unwrap_or_else(|| messages::NOTHING_PLAYING.to_string());
                self.announce(&text);
                Ok(())
            }
        }
    }

    /// Parse and run a command by its name.
    pub fn execute_named(&self, name: &str) -> Result<()> {
        self.execute(name.parse()?)
    }

    fn switch_list(&self, step: fn(&mut BufferListCollection) -> usize) -> Result<()> {
        let (event, summary) = {
            let mut buffers = self.buffers.write();
            let index = step(&mut *buffers);
            let list = buffers.current_list();
            (
                BufferEvent::CurrentListChanged {
                    list_id: list.id().to_string(),
                    name: list.name().to_string(),
                    index,
                },
                messages::list_summary(list.name(), list.len()),
            )
        };
        self.emit(event);
        self.announce(&summary);
        Ok(())
    }

    fn navigate_item(&self, edge: Edge, step: fn(&mut BufferList) -> Navigation) -> Result<()> {
        let text = {
            let mut buffers = self.buffers.write();
            let list = buffers.current_list_mut();
            let navigation = step(&mut *list);
            debug!(list = %list.name(), ?navigation, "Item navigation");
            match navigation {
                Navigation::Moved(_) => list
                    .current_item()
                    .map(BufferItem::announcement)
                    .unwrap_or_default(),
                Navigation::Boundary => match edge {
                    Edge::Top => messages::TOP_OF_LIST.to_string(),
                    Edge::Bottom => messages::BOTTOM_OF_LIST.to_string(),
                },
                Navigation::Empty => messages::BUFFER_EMPTY.to_string(),
            }
        };
        self.announce(&text);
        Ok(())
    }

    fn dismiss_current_buffer(&self) -> Result<()> {
        let outcome = {
            let mut buffers = self.buffers.write();
            let name = buffers.current_list().name().to_string();
            match buffers.dismiss_current() {
                Ok(removed) => {
                    let current = buffers.current_list();
                    Ok((
                        BufferEvent::ListDismissed {
                            list_id: removed.id().to_string(),
                            name: removed.name().to_string(),
                        },
                        BufferEvent::CurrentListChanged {
                            list_id: current.id().to_string(),
                            name: current.name().to_string(),
                            index: buffers.current_index(),
                        },
                        messages::list_summary(current.name(), current.len()),
                    ))
                }
                Err(err) => Err((name, err)),
            }
        };

        match outcome {
            Ok((dismissed, changed, summary)) => {
                info!("Buffer dismissed");
                self.emit(dismissed);
                self.emit(changed);
                self.announce(&summary);
                Ok(())
            }
            Err((name, err)) => {
                debug!(list = %name, "Refusing to dismiss buffer");
                self.announce(&messages::cannot_dismiss(&name));
                Err(err.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Activation
    // ------------------------------------------------------------------

    /// Act on the item under the cursor: play a track, open a playlist,
    /// or toggle pause on the track already playing.
    pub fn activate_current_item(&self) -> Result<()> {
        let (item, queue_index) = {
            let buffers = self.buffers.read();
            let list = buffers.current_list();
            let queue_index = if buffers.is_current_play_queue() {
                list.current_index()
            } else {
                None
            };
            (list.current_item().cloned(), queue_index)
        };

        let Some(item) = item else {
            self.announce(messages::BUFFER_EMPTY);
            return Ok(());
        };

        if let Some(track) = item.as_track() {
            return self.activate_track(Arc::clone(track), queue_index);
        }
        if let Some(playlist) = item.as_playlist() {
            self.open_playlist(Arc::clone(playlist));
            return Ok(());
        }
        self.announce(&messages::item_activated(&item.display_text()));
        Ok(())
    }

    fn activate_track(&self, track: Arc<Track>, queue_index: Option<usize>) -> Result<()> {
        // Inside the queue only the head is the playing entry; a duplicate
        // further down is picked like any other entry.
        let is_playing = queue_index.map_or(true, |index| index == 0)
            && self
                .coordinator
                .playing_track()
                .map_or(false, |playing| playing.id == track.id);
        if is_playing {
            match self.coordinator.toggle_pause()? {
                TransportOutcome::Paused => self.announce(messages::PAUSED),
                TransportOutcome::Playing => self.announce(messages::PLAYING),
                TransportOutcome::NoTrack => {}
            }
            return Ok(());
        }

        match queue_index {
            Some(index) => self.queue.pick_from_queue(index)?,
            None => self.queue.play_now(track)?,
        };
        Ok(())
    }

    fn open_playlist(&self, playlist: Arc<Playlist>) {
        self.announce(messages::LOADING_PLAYLIST);
        let list = BufferList::new(playlist.name.clone(), true)
            .with_jump_size(self.settings.navigation.jump_size);
        let id = self.open_list(list);
        self.announce(&playlist.name);

        let count = {
            let mut buffers = self.buffers.write();
            match buffers.get_mut(id) {
                Some(list) => {
                    list.extend(playlist.tracks.iter().cloned().map(BufferItem::Track));
                    list.len()
                }
                None => 0,
            }
        };
        info!(playlist = %playlist.id, tracks = count, "Playlist opened");
        self.announce(&messages::tracks_loaded(count));
    }

    /// Add `list` to the collection and make it current.
    fn open_list(&self, list: BufferList) -> BufferId {
        let name = list.name().to_string();
        let (id, index) = {
            let mut buffers = self.buffers.write();
            let id = buffers.add(list);
            buffers.set_current(id);
            (id, buffers.current_index())
        };
        self.emit(BufferEvent::ListOpened {
            list_id: id.to_string(),
            name: name.clone(),
        });
        self.emit(BufferEvent::CurrentListChanged {
            list_id: id.to_string(),
            name,
            index,
        });
        id
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    /// Replace the contents of the Playlists buffer.
    pub fn load_playlists(&self, playlists: Vec<Arc<Playlist>>) {
        let count = playlists.len();
        {
            let mut buffers = self.buffers.write();
            if let Some(list) = buffers.get_mut(self.playlists_id) {
                list.clear();
                list.extend(playlists.into_iter().map(BufferItem::Playlist));
            }
        }
        info!(count, "Playlists loaded");
        self.announce(&messages::playlists_loaded(count));
    }

    /// Open a buffer with search results. The buffer owns `session` and
    /// closes it when dismissed.
    pub fn open_search_results(
        &self,
        query: &str,
        hits: Vec<Arc<Track>>,
        session: Option<Box<dyn SearchSession>>,
    ) -> BufferId {
        let suggestion = session.as_ref().and_then(|session| session.did_you_mean());
        let mut list = BufferList::new(messages::search_title(query), true)
            .with_jump_size(self.settings.navigation.jump_size);
        if let Some(session) = session {
            list = list.with_resource(session);
        }

        let text = if hits.is_empty() {
            let text = messages::no_search_results(suggestion.as_deref());
            list.add(BufferItem::text(text.clone()));
            text
        } else {
            let count = hits.len();
            list.extend(
                hits.into_iter()
                    .enumerate()
                    .map(|(i, track)| BufferItem::SearchResult(SearchHit::new(query, track, i + 1))),
            );
            messages::search_result_count(count)
        };

        let id = self.open_list(list);
        self.announce(&text);
        id
    }

    // ------------------------------------------------------------------
    // Queue
    // ------------------------------------------------------------------

    pub fn enqueue(&self, track: Arc<Track>) -> usize {
        self.queue.enqueue(track)
    }

    pub fn enqueue_next(&self, track: Arc<Track>) -> usize {
        self.queue.enqueue_next(track)
    }

    /// Queue the track under the cursor, either at the end or right after
    /// the head.
    pub fn enqueue_current_item(&self, next: bool) -> Result<usize> {
        let track = self.with_buffers(|buffers| {
            buffers
                .current_list()
                .current_item()
                .and_then(BufferItem::as_track)
                .cloned()
        });
        let track = track.ok_or_else(|| {
            CoreError::InvalidOperation("Current item is not a track".to_string())
        })?;
        Ok(if next {
            self.queue.enqueue_next(track)
        } else {
            self.queue.enqueue(track)
        })
    }

    // ------------------------------------------------------------------
    // Decoder and audio sink
    // ------------------------------------------------------------------

    pub fn audio_data_arrived(&self, bytes: &[u8]) -> AppendOutcome {
        self.coordinator.audio_data_arrived(bytes)
    }

    pub fn audio_data_arrived_for(&self, generation: Generation, bytes: &[u8]) -> AppendOutcome {
        self.coordinator.audio_data_arrived_for(generation, bytes)
    }

    pub fn audio_stream_complete(&self) {
        self.coordinator.audio_stream_complete();
    }

    /// Completion for the load tagged `generation`; stale ones are ignored.
    pub fn audio_stream_complete_for(&self, generation: Generation) -> bool {
        self.coordinator.audio_stream_complete_for(generation)
    }

    /// Report a decoder failure; the queue moves on to the next track.
    pub fn stream_error(&self, reason: &str) {
        if let Some(ended) = self.coordinator.stream_error(reason) {
            self.advance_after(&ended);
        }
    }

    /// Decoder failure for the load tagged `generation`. A stale one leaves
    /// the queue and the current track alone.
    pub fn stream_error_for(&self, generation: Generation, reason: &str) {
        if let Some(ended) = self.coordinator.stream_error_for(generation, reason) {
            self.advance_after(&ended);
        }
    }

    /// Poll audio for the sink. When the track ends, the next queued track
    /// is loaded before this returns.
    pub fn pull_audio(&self, max: usize) -> AudioPull {
        let pull = self.coordinator.pull_audio(max);
        if let AudioPull::Ended(ended) = &pull {
            self.advance_after(ended);
        }
        pull
    }

    fn advance_after(&self, ended: &TrackEnded) {
        if let Err(err) = self.queue.handle_end_of_track(ended) {
            warn!(track_id = %ended.track.id, error = %err, "Could not advance queue");
        }
    }

    pub fn toggle_pause(&self) -> Result<TransportOutcome> {
        Ok(self.coordinator.toggle_pause()?)
    }

    pub fn stop(&self) {
        self.coordinator.stop();
    }

    // ------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> ServiceSnapshot {
        let (buffers, current_buffer, queue) = {
            let buffers = self.buffers.read();
            let summaries = buffers
                .iter()
                .map(|list| BufferSummary {
                    name: list.name().to_string(),
                    len: list.len(),
                    current_index: list.current_index(),
                    dismissable: list.is_dismissable(),
                })
                .collect();
            let queue = buffers
                .play_queue()
                .items()
                .iter()
                .filter_map(BufferItem::as_track)
                .map(|track| track.id.to_string())
                .collect();
            (summaries, buffers.current_index(), queue)
        };
        ServiceSnapshot {
            buffers,
            current_buffer,
            queue,
            status: self.coordinator.status(),
            playing: self
                .coordinator
                .playing_track()
                .map(|track| track.id.to_string()),
            volume: self.coordinator.volume(),
        }
    }

    fn announce(&self, text: &str) {
        self.announcer.announce(text, true);
    }

    fn emit(&self, event: BufferEvent) {
        self.events.emit(CoreEvent::Buffers(event)).ok();
    }
}
