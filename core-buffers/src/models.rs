//! Domain models for browsable content
//!
//! Tracks and playlists are immutable snapshots handed over by the streaming
//! backend. Buffers share them through `Arc`; nothing in the engine mutates a
//! model after creation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// ID Types
// =============================================================================

/// Backend identifier for a track (usually a `spotify:track:...` URI).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TrackId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Backend identifier for a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(pub String);

impl PlaylistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Track
// =============================================================================

/// A playable track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artists: Vec<String>,
    pub album: Option<String>,
    pub duration_ms: Option<u64>,
}

impl Track {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(id),
            title: title.into(),
            artists: Vec::new(),
            album: None,
            duration_ms: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artists.push(artist.into());
        self
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// `"Title by Artist, Artist"`, or just the title when no artist is known.
    pub fn display_text(&self) -> String {
        if self.artists.is_empty() {
            self.title.clone()
        } else {
            format!("{} by {}", self.title, self.artists.join(", "))
        }
    }

    /// Display text plus album and duration when known.
    pub fn announcement(&self) -> String {
        let mut text = self.display_text();
        if let Some(album) = &self.album {
            text.push_str(", from ");
            text.push_str(album);
        }
        if let Some(duration) = self.duration_ms {
            text.push_str(", ");
            text.push_str(&format_duration(duration));
        }
        text
    }

    /// Requests the decoder understands.
    pub fn to_request(&self) -> bridge_traits::TrackRequest {
        bridge_traits::TrackRequest::new(self.id.as_str(), self.title.as_str())
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// `m:ss`, or `h:mm:ss` past an hour.
pub fn format_duration(duration_ms: u64) -> String {
    let total_secs = duration_ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

// =============================================================================
// Playlist
// =============================================================================

/// A named, ordered set of tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub owner: Option<String>,
    pub tracks: Vec<Arc<Track>>,
}

impl Playlist {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PlaylistId::new(id),
            name: name.into(),
            owner: None,
            tracks: Vec::new(),
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_tracks(mut self, tracks: impl IntoIterator<Item = Track>) -> Self {
        self.tracks.extend(tracks.into_iter().map(Arc::new));
        self
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn announcement(&self) -> String {
        let count = self.track_count();
        let noun = if count == 1 { "track" } else { "tracks" };
        match &self.owner {
            Some(owner) => format!("{}, by {}, {} {}", self.name, owner, count, noun),
            None => format!("{}, {} {}", self.name, count, noun),
        }
    }
}

impl fmt::Display for Playlist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
