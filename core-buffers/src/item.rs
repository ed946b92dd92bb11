//! Items shown inside a buffer.

use crate::models::{Playlist, Track};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// One search result, remembered with the query and its rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub query: String,
    pub track: Arc<Track>,
    /// 1-based position in the result list.
    pub rank: usize,
}

impl SearchHit {
    pub fn new(query: impl Into<String>, track: Arc<Track>, rank: usize) -> Self {
        Self {
            query: query.into(),
            track,
            rank,
        }
    }
}

/// Anything that can sit in a buffer.
///
/// Track and playlist variants share the model with whoever else holds it;
/// the item never owns it exclusively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum BufferItem {
    /// Plain text, e.g. "No search results".
    Text(String),
    Track(Arc<Track>),
    Playlist(Arc<Playlist>),
    SearchResult(SearchHit),
}

impl BufferItem {
    pub fn text(text: impl Into<String>) -> Self {
        BufferItem::Text(text.into())
    }

    pub fn track(track: impl Into<Arc<Track>>) -> Self {
        BufferItem::Track(track.into())
    }

    pub fn playlist(playlist: impl Into<Arc<Playlist>>) -> Self {
        BufferItem::Playlist(playlist.into())
    }

    /// Short form for lists and status displays.
    pub fn display_text(&self) -> String {
        match self {
            BufferItem::Text(text) => text.clone(),
            BufferItem::Track(track) => track.display_text(),
            BufferItem::Playlist(playlist) => playlist.name.clone(),
            BufferItem::SearchResult(hit) => hit.track.display_text(),
        }
    }

    /// Full form spoken when the cursor lands on the item.
    pub fn announcement(&self) -> String {
        match self {
            BufferItem::Text(text) => text.clone(),
            BufferItem::Track(track) => track.announcement(),
            BufferItem::Playlist(playlist) => playlist.announcement(),
            BufferItem::SearchResult(hit) => format!("{}. {}", hit.rank, hit.track.announcement()),
        }
    }

    /// The playable track behind this item, if there is one.
    pub fn as_track(&self) -> Option<&Arc<Track>> {
        match self {
            BufferItem::Track(track) => Some(track),
            BufferItem::SearchResult(hit) => Some(&hit.track),
            _ => None,
        }
    }

    pub fn as_playlist(&self) -> Option<&Arc<Playlist>> {
        match self {
            BufferItem::Playlist(playlist) => Some(playlist),
            _ => None,
        }
    }

    pub fn is_playable(&self) -> bool {
        self.as_track().is_some()
    }
}

impl fmt::Display for BufferItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<Arc<Track>> for BufferItem {
    fn from(track: Arc<Track>) -> Self {
        BufferItem::Track(track)
    }
}

impl From<Arc<Playlist>> for BufferItem {
    fn from(playlist: Arc<Playlist>) -> Self {
        BufferItem::Playlist(playlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song() -> Arc<Track> {
        Arc::new(
            Track::new("spotify:track:1", "Clocks")
                .with_artist("Coldplay")
                .with_duration_ms(307_000),
        )
    }

    #[test]
    fn test_text_item() {
        let item = BufferItem::text("No search results");
        assert_eq!(item.display_text(), "No search results");
        assert_eq!(item.announcement(), "No search results");
        assert!(item.as_track().is_none());
        assert!(!item.is_playable());
    }

    #[test]
    fn test_track_item_shares_model() {
        let track = song();
        let item = BufferItem::track(Arc::clone(&track));
        assert!(Arc::ptr_eq(item.as_track().unwrap(), &track));
        assert_eq!(item.display_text(), "Clocks by Coldplay");
        assert_eq!(item.announcement(), "Clocks by Coldplay, 5:07");
    }

    #[test]
    fn test_search_result_exposes_track_and_rank() {
        let hit = BufferItem::SearchResult(SearchHit::new("clocks", song(), 2));
        assert_eq!(hit.display_text(), "Clocks by Coldplay");
        assert_eq!(hit.announcement(), "2. Clocks by Coldplay, 5:07");
        assert!(hit.is_playable());
    }

    #[test]
    fn test_playlist_item() {
        let playlist = Arc::new(Playlist::new("pl:1", "Morning"));
        let item = BufferItem::playlist(playlist);
        assert_eq!(item.to_string(), "Morning");
        assert_eq!(item.announcement(), "Morning, 0 tracks");
        assert!(item.as_playlist().is_some());
        assert!(!item.is_playable());
    }

    #[test]
    fn test_items_compare_by_content() {
        assert_eq!(BufferItem::track(song()), BufferItem::track(song()));
        assert_ne!(BufferItem::text("a"), BufferItem::text("b"));
    }
}
