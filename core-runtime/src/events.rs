//! # Event Bus System
//!
//! Typed, broadcast-based notifications for everything the engine does, built
//! on `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! Speech output goes straight to the injected `Announcer`; the event bus is
//! the *observable* side channel. Hosts subscribe to it to refresh status
//! displays, write diagnostics, or drive tests without scraping announcements.
//!
//! - **Event Types**: one enum per domain (playback, queue, buffers)
//! - **EventBus**: central broadcast channel for publishing events
//! - **EventStream**: wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   emit    ┌───────────┐
//! │ PlaybackCoord.   ├──────────>│           │   subscribe   ┌────────────┐
//! └──────────────────┘           │ EventBus  ├──────────────>│ Status bar │
//! ┌──────────────────┐   emit    │ (broadcast│               └────────────┘
//! │ PlayQueueCtrl    ├──────────>│  channel) │   subscribe   ┌────────────┐
//! └──────────────────┘           │           ├──────────────>│ Test probe │
//! ┌──────────────────┐   emit    │           │               └────────────┘
//! │ CoreService      ├──────────>│           │
//! └──────────────────┘           └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::Completed {
//!     track_id: "spotify:track:1".to_string(),
//! }))
//! .ok();
//!
//! let event = rx.recv().await.unwrap();
//! assert_eq!(event.description(), "Track completed");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Non-fatal.
//! - **`RecvError::Closed`**: every sender is gone. Treat as shutdown.
//!
//! Publishers call `emit(..).ok()`: having nobody listening is normal.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Transport and streaming events
    Playback(PlaybackEvent),
    /// Play queue changes
    Queue(QueueEvent),
    /// Buffer list navigation and lifecycle
    Buffers(BufferEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Queue(e) => e.description(),
            CoreEvent::Buffers(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error {
                recoverable: false, ..
            }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. })
            | CoreEvent::Playback(PlaybackEvent::LoadFailed { .. })
            | CoreEvent::Queue(QueueEvent::Skipped { .. })
            | CoreEvent::Queue(QueueEvent::SkipLimitReached { .. }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::Started { .. })
            | CoreEvent::Playback(PlaybackEvent::Completed { .. })
            | CoreEvent::Queue(QueueEvent::Exhausted) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by the playback coordinator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A load was handed to the decoder.
    Loading { track_id: String, title: String },
    /// The decoder accepted the track and playback began.
    Started { track_id: String, title: String },
    Paused { track_id: String },
    Resumed { track_id: String },
    /// Playback was stopped before the track ended.
    Stopped { track_id: String },
    /// The playing track changed. `None` fields mean nothing is playing.
    TrackChanged {
        track_id: Option<String>,
        title: Option<String>,
    },
    /// All audio for the track was played out.
    Completed { track_id: String },
    VolumeChanged {
        /// Volume scaled to 0..=100.
        volume_percent: u8,
    },
    /// The decoder refused the track.
    LoadFailed { track_id: String, reason: String },
    /// Playback error reported by the decoder.
    Error {
        track_id: Option<String>,
        message: String,
        /// Whether the queue can carry on past this error.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Loading { .. } => "Loading track",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::TrackChanged { .. } => "Playing track changed",
            PlaybackEvent::Completed { .. } => "Track completed",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::LoadFailed { .. } => "Track failed to load",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Queue Events
// ============================================================================

/// Events emitted by the play queue controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum QueueEvent {
    /// A track was added to the queue at `position`.
    Enqueued { track_id: String, position: usize },
    /// The queue moved on and `track_id` is now at the head.
    Advanced { track_id: String, remaining: usize },
    /// The queue was cleared and restarted with a single track.
    Replaced { track_id: String },
    /// An unplayable head was dropped.
    Skipped { track_id: String, reason: String },
    /// Gave up after too many unplayable tracks in a row.
    SkipLimitReached { skipped: u32 },
    /// Nothing left to play.
    Exhausted,
}

impl QueueEvent {
    fn description(&self) -> &str {
        match self {
            QueueEvent::Enqueued { .. } => "Track enqueued",
            QueueEvent::Advanced { .. } => "Queue advanced",
            QueueEvent::Replaced { .. } => "Queue replaced",
            QueueEvent::Skipped { .. } => "Unplayable track skipped",
            QueueEvent::SkipLimitReached { .. } => "Skip limit reached",
            QueueEvent::Exhausted => "Queue exhausted",
        }
    }
}

// ============================================================================
// Buffer Events
// ============================================================================

/// Events describing the buffer list collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum BufferEvent {
    ListOpened { list_id: String, name: String },
    ListDismissed { list_id: String, name: String },
    CurrentListChanged {
        list_id: String,
        name: String,
        index: usize,
    },
}

impl BufferEvent {
    fn description(&self) -> &str {
        match self {
            BufferEvent::ListOpened { .. } => "Buffer opened",
            BufferEvent::ListDismissed { .. } => "Buffer dismissed",
            BufferEvent::CurrentListChanged { .. } => "Current buffer changed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Cloning the bus clones the sender; every clone publishes into the same
/// channel. Each `subscribe()` creates an independent receiver.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{BufferEvent, CoreEvent, EventBus};
///
/// let bus = EventBus::new(16);
/// let _rx = bus.subscribe();
/// let sent = bus
///     .emit(CoreEvent::Buffers(BufferEvent::ListOpened {
///         list_id: "1".into(),
///         name: "Search for: blue".into(),
///     }))
///     .unwrap();
/// assert_eq!(sent, 1);
/// ```
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls more than `capacity` events behind receives
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let queue_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Queue(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` if the subscriber fell behind by `n` events,
    /// `RecvError::Closed` once all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without waiting.
    ///
    /// Returns `None` if no matching event is currently queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drains every queued event that passes the filter.
    pub fn drain(&mut self) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Some(result) = self.try_recv() {
            match result {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(id: &str) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::Completed {
            track_id: id.to_string(),
        })
    }

    #[tokio::test]
    async fn test_event_bus_subscription() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        let _sub1 = bus.subscribe();
        let _sub2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::new(10);
        assert!(bus.emit(CoreEvent::Queue(QueueEvent::Exhausted)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = CoreEvent::Queue(QueueEvent::Enqueued {
            track_id: "spotify:track:a".to_string(),
            position: 3,
        });
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Queue(_)));

        bus.emit(completed("a")).ok();
        let queue_event = CoreEvent::Queue(QueueEvent::Advanced {
            track_id: "b".to_string(),
            remaining: 1,
        });
        bus.emit(queue_event.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), queue_event);
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(completed(&format!("track-{}", i))).ok();
        }

        let result = sub.recv().await;
        assert!(matches!(result, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let fatal = CoreEvent::Playback(PlaybackEvent::Error {
            track_id: None,
            message: "decoder crashed".to_string(),
            recoverable: false,
        });
        assert_eq!(fatal.severity(), EventSeverity::Error);

        let stream_hiccup = CoreEvent::Playback(PlaybackEvent::Error {
            track_id: Some("a".to_string()),
            message: "connection reset".to_string(),
            recoverable: true,
        });
        assert_eq!(stream_hiccup.severity(), EventSeverity::Warning);

        let skipped = CoreEvent::Queue(QueueEvent::Skipped {
            track_id: "a".to_string(),
            reason: "Track is not available".to_string(),
        });
        assert_eq!(skipped.severity(), EventSeverity::Warning);

        assert_eq!(completed("a").severity(), EventSeverity::Info);

        let volume = CoreEvent::Playback(PlaybackEvent::VolumeChanged { volume_percent: 55 });
        assert_eq!(volume.severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_description() {
        let event = CoreEvent::Buffers(BufferEvent::ListDismissed {
            list_id: "x".to_string(),
            name: "Search for: cats".to_string(),
        });
        assert_eq!(event.description(), "Buffer dismissed");
        assert_eq!(
            CoreEvent::Queue(QueueEvent::Exhausted).description(),
            "Queue exhausted"
        );
    }

    #[tokio::test]
    async fn test_concurrent_publishers() {
        let bus = EventBus::new(100);
        let mut sub = bus.subscribe();

        let bus1 = bus.clone();
        let bus2 = bus.clone();

        let handle1 = tokio::spawn(async move {
            for i in 0..10 {
                bus1.emit(completed(&format!("a-{}", i))).ok();
            }
        });
        let handle2 = tokio::spawn(async move {
            for i in 0..10u8 {
                bus2.emit(CoreEvent::Playback(PlaybackEvent::VolumeChanged {
                    volume_percent: i * 10,
                }))
                .ok();
            }
        });

        handle1.await.ok();
        handle2.await.ok();

        let mut count = 0;
        while sub.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Playback(PlaybackEvent::TrackChanged {
            track_id: Some("spotify:track:9".to_string()),
            title: Some("Nine".to_string()),
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"Playback\""));
        assert!(json.contains("\"event\":\"TrackChanged\""));

        let deserialized: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, event);
    }

    #[tokio::test]
    async fn test_try_recv_empty() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe());
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_drain_respects_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Playback(_)));

        bus.emit(completed("a")).ok();
        bus.emit(CoreEvent::Queue(QueueEvent::Exhausted)).ok();
        bus.emit(completed("b")).ok();

        let drained = stream.drain();
        assert_eq!(drained, vec![completed("a"), completed("b")]);
        assert!(stream.try_recv().is_none());
    }
}
