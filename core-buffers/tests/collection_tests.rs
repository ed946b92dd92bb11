use bridge_traits::SearchSession;
use core_buffers::{
    BufferItem, BufferList, BufferListCollection, Navigation, Playlist, SearchHit, Track,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct RecordingSession {
    query: String,
    suggestion: Option<String>,
    closes: Arc<AtomicUsize>,
}

impl RecordingSession {
    fn boxed(query: &str, closes: &Arc<AtomicUsize>) -> Box<dyn SearchSession> {
        Box::new(Self {
            query: query.to_string(),
            suggestion: None,
            closes: Arc::clone(closes),
        })
    }
}

impl SearchSession for RecordingSession {
    fn query(&self) -> &str {
        &self.query
    }

    fn did_you_mean(&self) -> Option<String> {
        self.suggestion.clone()
    }

    fn close(&mut self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn browsing_session() -> BufferListCollection {
    let queue = BufferList::new("Play Queue", false);
    let queue_id = queue.id();
    let playlists = BufferList::new("Playlists", false).with_items([
        BufferItem::playlist(Playlist::new("pl:1", "Morning")),
        BufferItem::playlist(Playlist::new("pl:2", "Evening")),
    ]);
    BufferListCollection::with_lists(vec![playlists, queue], queue_id).unwrap()
}

fn search_results(query: &str, closes: &Arc<AtomicUsize>) -> BufferList {
    let hits = (1..=3).map(|rank| {
        let track = Arc::new(Track::new(format!("t{}", rank), format!("{} {}", query, rank)));
        BufferItem::SearchResult(SearchHit::new(query, track, rank))
    });
    BufferList::new(format!("Search for: {}", query), true)
        .with_items(hits)
        .with_resource(RecordingSession::boxed(query, closes))
}

#[test]
fn test_dismissing_search_results_returns_to_previous_buffer() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut buffers = browsing_session();
    let id = buffers.add(search_results("blue", &closes));
    buffers.set_current(id);
    assert_eq!(buffers.current_list().name(), "Search for: blue");

    let dismissed = buffers.dismiss_current().unwrap();
    assert_eq!(dismissed.name(), "Search for: blue");
    assert_eq!(buffers.current_list().name(), "Play Queue");
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_search_session_closed_exactly_once() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut list = search_results("red", &closes);
    assert!(list.release_resources());
    assert!(!list.release_resources());
    drop(list);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_several_searches_each_closed_once() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut buffers = browsing_session();
    let ids: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|query| buffers.add(search_results(query, &closes)))
        .collect();

    buffers.remove(ids[1]).unwrap();
    assert_eq!(closes.load(Ordering::SeqCst), 1);

    drop(buffers);
    assert_eq!(closes.load(Ordering::SeqCst), 3);
}

#[test]
fn test_cycling_buffers_wraps_both_ways() {
    let closes = Arc::new(AtomicUsize::new(0));
    let mut buffers = browsing_session();
    buffers.add(search_results("green", &closes));

    let visited: Vec<String> = (0..4)
        .map(|_| {
            buffers.next_list();
            buffers.current_list().name().to_string()
        })
        .collect();
    assert_eq!(
        visited,
        ["Play Queue", "Search for: green", "Playlists", "Play Queue"]
    );

    buffers.previous_list();
    buffers.previous_list();
    assert_eq!(buffers.current_list().name(), "Search for: green");
}

#[test]
fn test_item_navigation_inside_current_buffer() {
    let mut buffers = browsing_session();
    let list = buffers.current_list_mut();
    assert_eq!(list.current_item().unwrap().display_text(), "Morning");
    assert_eq!(list.next_item(), Navigation::Moved(1));
    assert_eq!(list.next_item(), Navigation::Boundary);
    assert_eq!(list.current_item().unwrap().display_text(), "Evening");
}

#[test]
fn test_queue_survives_dismiss_attempts() {
    let mut buffers = browsing_session();
    buffers
        .play_queue_mut()
        .add(BufferItem::track(Track::new("t1", "One")));
    let queue_id = buffers.play_queue_id();
    buffers.set_current(queue_id);

    assert!(buffers.dismiss_current().is_err());
    assert!(buffers.dismiss(queue_id).is_err());
    assert!(buffers.remove(queue_id).is_err());
    assert_eq!(buffers.len(), 2);
    assert_eq!(buffers.play_queue().len(), 1);
    assert!(buffers.is_current_play_queue());
}
