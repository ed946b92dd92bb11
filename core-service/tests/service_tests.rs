//! Command handling and buffer management through the service façade.

mod common;

use common::{fixture, track, FakeSearch};
use core_buffers::{Playlist, Track};
use core_playback::PlaybackStatus;
use core_runtime::events::{BufferEvent, CoreEvent};
use core_service::{Command, CoreError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn playlist(id: &str, name: &str, tracks: &[&str]) -> Arc<Playlist> {
    Arc::new(
        Playlist::new(id, name)
            .with_tracks(tracks.iter().map(|id| Track::new(*id, id.to_uppercase()))),
    )
}

fn run(fx: &common::Fixture, commands: &[Command]) {
    for command in commands {
        fx.service.execute(*command).unwrap();
    }
}

#[test]
fn test_starts_on_playlists_with_empty_queue() {
    let fx = fixture();
    let snapshot = fx.service.snapshot();
    let names: Vec<_> = snapshot.buffers.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Playlists", "Play Queue"]);
    assert_eq!(snapshot.current_buffer, 0);
    assert!(snapshot.queue.is_empty());
    assert_eq!(snapshot.status, PlaybackStatus::Idle);
    assert!(snapshot.buffers.iter().all(|b| !b.dismissable));
}

#[test]
fn test_buffer_navigation_announces_summary() {
    let fx = fixture();
    fx.service
        .load_playlists(vec![playlist("p1", "Morning", &[]), playlist("p2", "Evening", &[])]);
    assert_eq!(fx.announcer.last().as_deref(), Some("2 playlists loaded"));

    run(&fx, &[Command::NextBuffer]);
    assert_eq!(fx.announcer.last().as_deref(), Some("Play Queue, empty"));
    run(&fx, &[Command::NextBuffer]);
    assert_eq!(fx.announcer.last().as_deref(), Some("Playlists, 2 items"));
    run(&fx, &[Command::PreviousBuffer]);
    assert_eq!(fx.announcer.last().as_deref(), Some("Play Queue, empty"));
}

#[test]
fn test_item_navigation_and_boundaries() {
    let fx = fixture();
    fx.service
        .load_playlists(vec![playlist("p1", "Morning", &["t1"]), playlist("p2", "Evening", &[])]);
    fx.announcer.take();

    run(
        &fx,
        &[
            Command::PreviousBufferItem,
            Command::NextBufferItem,
            Command::NextBufferItem,
            Command::FirstBufferItem,
            Command::NextBufferItemJump,
        ],
    );
    assert_eq!(
        fx.announcer.take(),
        [
            "Top of list",
            "Evening, 0 tracks",
            "Bottom of list",
            "Morning, 1 track",
            "Evening, 0 tracks",
        ]
    );
}

#[test]
fn test_navigation_in_empty_buffer() {
    let fx = fixture();
    run(&fx, &[Command::NextBuffer, Command::NextBufferItem]);
    assert_eq!(fx.announcer.last().as_deref(), Some("Buffer is empty"));
    run(&fx, &[Command::ActivateBufferItem]);
    assert_eq!(fx.announcer.last().as_deref(), Some("Buffer is empty"));
}

#[test]
fn test_dismissing_play_queue_is_refused() {
    let fx = fixture();
    run(&fx, &[Command::NextBuffer]);
    let before = fx.service.snapshot();

    let err = fx.service.execute(Command::DismissBuffer).unwrap_err();
    assert!(err.is_invalid_operation());
    assert_eq!(
        fx.announcer.last().as_deref(),
        Some("Cannot dismiss buffer Play Queue")
    );
    assert_eq!(fx.service.snapshot(), before);
}

#[test]
fn test_activate_playlist_opens_buffer() {
    let fx = fixture();
    let mut events = fx.service.subscribe_events();
    fx.service
        .load_playlists(vec![playlist("p1", "Road trip", &["t1", "t2", "t3"])]);
    fx.announcer.take();

    run(&fx, &[Command::ActivateBufferItem]);

    assert_eq!(
        fx.announcer.take(),
        ["Loading playlist", "Road trip", "3 tracks loaded"]
    );
    let snapshot = fx.service.snapshot();
    assert_eq!(snapshot.current_buffer, 2);
    assert_eq!(snapshot.buffers[2].name, "Road trip");
    assert_eq!(snapshot.buffers[2].len, 3);
    assert!(snapshot.buffers[2].dismissable);

    assert!(events.drain().iter().any(|event| matches!(
        event,
        CoreEvent::Buffers(BufferEvent::ListOpened { name, .. }) if name == "Road trip"
    )));
}

#[test]
fn test_activate_track_from_playlist_replaces_queue() {
    let fx = fixture();
    fx.service
        .load_playlists(vec![playlist("p1", "Mix", &["a", "b", "c"])]);
    fx.service.enqueue(track("old"));
    run(
        &fx,
        &[
            Command::ActivateBufferItem,
            Command::NextBufferItem,
            Command::NextBufferItem,
            Command::ActivateBufferItem,
        ],
    );

    assert_eq!(fx.service.snapshot().queue, ["c"]);
    assert_eq!(*fx.loads.lock(), ["c"]);
    assert_eq!(fx.service.coordinator().status(), PlaybackStatus::Playing);
}

#[test]
fn test_activate_track_with_empty_queue() {
    let fx = fixture();
    fx.service
        .load_playlists(vec![playlist("p1", "Mix", &["a", "b", "c"])]);
    run(
        &fx,
        &[
            Command::ActivateBufferItem,
            Command::LastBufferItem,
            Command::ActivateBufferItem,
        ],
    );

    assert_eq!(fx.service.snapshot().queue, ["c"]);
    assert_eq!(*fx.loads.lock(), ["c"]);
    assert_eq!(fx.service.snapshot().playing.as_deref(), Some("c"));
}

#[test]
fn test_activate_playing_track_toggles_pause() {
    let fx = fixture();
    fx.service.load_playlists(vec![playlist("p1", "Mix", &["a"])]);
    run(
        &fx,
        &[Command::ActivateBufferItem, Command::ActivateBufferItem],
    );
    assert_eq!(fx.service.coordinator().status(), PlaybackStatus::Playing);

    run(&fx, &[Command::ActivateBufferItem]);
    assert_eq!(fx.announcer.last().as_deref(), Some("Paused"));
    assert!(fx.service.coordinator().is_paused());

    run(&fx, &[Command::ActivateBufferItem]);
    assert_eq!(fx.announcer.last().as_deref(), Some("Playing"));
    assert_eq!(*fx.loads.lock(), ["a"]);
}

#[test]
fn test_activate_in_queue_picks_entry() {
    let fx = fixture();
    for id in ["a", "b", "c"] {
        fx.service.enqueue(track(id));
    }
    run(
        &fx,
        &[
            Command::NextBuffer,
            Command::LastBufferItem,
            Command::ActivateBufferItem,
        ],
    );
    assert_eq!(fx.service.snapshot().queue, ["c"]);
    assert_eq!(*fx.loads.lock(), ["c"]);
}

#[test]
fn test_activate_duplicate_of_playing_track_in_queue_picks_it() {
    let fx = fixture();
    for id in ["a", "b", "a"] {
        fx.service.enqueue(track(id));
    }
    fx.service.queue().start_head().unwrap();
    run(
        &fx,
        &[
            Command::NextBuffer,
            Command::LastBufferItem,
            Command::ActivateBufferItem,
        ],
    );

    assert_eq!(fx.service.snapshot().queue, ["a"]);
    assert_eq!(*fx.loads.lock(), ["a", "a"]);
    assert_eq!(fx.service.coordinator().status(), PlaybackStatus::Playing);
}

#[test]
fn test_unplayable_pick_while_playing_clears_now_playing() {
    let fx = fixture();
    fx.service.enqueue(track("a"));
    fx.service.enqueue(track("bad-1"));
    fx.service.queue().start_head().unwrap();

    run(&fx, &[Command::NextBuffer, Command::LastBufferItem]);
    assert!(fx.service.execute(Command::ActivateBufferItem).is_err());

    assert!(fx.service.coordinator().playing_track().is_none());
    assert_eq!(
        *fx.announcer.track_changes.lock(),
        vec![Some("A by Artist".to_string()), None]
    );
}

#[test]
fn test_activate_unplayable_track_announces_failure() {
    let fx = fixture();
    fx.service
        .load_playlists(vec![playlist("p1", "Mix", &["bad-1"])]);
    fx.service.execute(Command::ActivateBufferItem).unwrap();

    let err = fx.service.execute(Command::ActivateBufferItem).unwrap_err();
    assert!(matches!(err, CoreError::Playback(_)));
    assert_eq!(
        fx.announcer.last().as_deref(),
        Some("Unable to play track: Track is not available")
    );
    assert!(fx.service.coordinator().playing_track().is_none());
}

#[test]
fn test_search_results_and_dismiss_closes_session() {
    let fx = fixture();
    let closes = Arc::new(AtomicUsize::new(0));
    let session = FakeSearch {
        query: "blue".into(),
        suggestion: None,
        closes: Arc::clone(&closes),
    };
    fx.service.open_search_results(
        "blue",
        vec![track("b1"), track("b2")],
        Some(Box::new(session)),
    );
    assert_eq!(fx.announcer.last().as_deref(), Some("2 search results"));

    run(&fx, &[Command::NextBufferItem]);
    assert_eq!(
        fx.announcer.last().as_deref(),
        Some("2. B2 by Artist")
    );

    run(&fx, &[Command::DismissBuffer]);
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(fx.announcer.last().as_deref(), Some("Play Queue, empty"));
    assert_eq!(fx.service.snapshot().buffers.len(), 2);
}

#[test]
fn test_search_without_results_suggests() {
    let fx = fixture();
    let session = FakeSearch {
        query: "beatels".into(),
        suggestion: Some("beatles".into()),
        closes: Arc::new(AtomicUsize::new(0)),
    };
    fx.service
        .open_search_results("beatels", Vec::new(), Some(Box::new(session)));

    let text = "No search results. Did you mean: beatles";
    assert_eq!(fx.announcer.last().as_deref(), Some(text));
    run(&fx, &[Command::ActivateBufferItem]);
    assert_eq!(
        fx.announcer.last(),
        Some(format!("{} item activated", text))
    );
}

#[test]
fn test_enqueue_current_item() {
    let fx = fixture();
    fx.service.open_search_results("x", vec![track("x1"), track("x2")], None);
    fx.service.enqueue(track("head"));
    fx.service.enqueue(track("tail"));

    assert_eq!(fx.service.enqueue_current_item(true).unwrap(), 1);
    assert_eq!(fx.service.snapshot().queue, ["head", "x1", "tail"]);

    run(&fx, &[Command::PreviousBuffer, Command::PreviousBuffer]);
    let err = fx.service.enqueue_current_item(false).unwrap_err();
    assert!(err.is_invalid_operation());
}

#[test]
fn test_volume_commands() {
    let fx = fixture();
    run(&fx, &[Command::PlaybackVolumeDown, Command::PlaybackVolumeDown]);
    assert_eq!(fx.announcer.last().as_deref(), Some("Quieter"));
    assert!((fx.service.coordinator().volume() - 0.9).abs() < 1e-6);

    run(&fx, &[Command::PlaybackVolumeUp; 5]);
    assert_eq!(fx.announcer.last().as_deref(), Some("Louder"));
    assert_eq!(fx.service.coordinator().volume(), 1.0);
}

#[test]
fn test_announce_now_playing() {
    let fx = fixture();
    run(&fx, &[Command::AnnounceNowPlaying]);
    assert_eq!(
        fx.announcer.last().as_deref(),
        Some("No track currently being played")
    );

    fx.service.enqueue(track("a"));
    fx.service.queue().start_head().unwrap();
    fx.service.execute_named("announce_now_playing").unwrap();
    assert_eq!(fx.announcer.last().as_deref(), Some("A by Artist"));
}

#[test]
fn test_unknown_command_name() {
    let fx = fixture();
    assert!(matches!(
        fx.service.execute_named("launch_rockets"),
        Err(CoreError::UnknownCommand(_))
    ));
}

#[test]
fn test_snapshot_serializes() {
    let fx = fixture();
    fx.service.enqueue(track("a"));
    let json = serde_json::to_value(fx.service.snapshot()).unwrap();
    assert_eq!(json["queue"][0], "a");
    assert_eq!(json["status"], "Idle");
    assert_eq!(json["buffers"][1]["name"], "Play Queue");
}

#[tokio::test]
async fn test_dismiss_emits_buffer_events() {
    let fx = fixture();
    let mut events = fx.service.subscribe_events();
    fx.service.open_search_results("x", vec![track("x1")], None);
    fx.service.execute(Command::DismissBuffer).unwrap();

    let dismissed = events.drain().into_iter().any(|event| {
        matches!(
            event,
            CoreEvent::Buffers(BufferEvent::ListDismissed { ref name, .. }) if name == "Search for: x"
        )
    });
    assert!(dismissed);
}
