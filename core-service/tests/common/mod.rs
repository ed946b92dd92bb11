//! Shared test doubles for the service tests.

#![allow(dead_code)]

use bridge_traits::{Announcer, BridgeError, DecoderSession, SearchSession, TrackRequest};
use core_buffers::Track;
use core_runtime::config::{CoreConfig, CoreConfigBuilder};
use core_service::CoreService;
use mockall::mock;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mock! {
    pub Decoder {}

    impl DecoderSession for Decoder {
        fn load_track(&self, track: &TrackRequest) -> Result<(), BridgeError>;
        fn unload(&self);
        fn transport_play(&self) -> Result<(), BridgeError>;
        fn transport_pause(&self) -> Result<(), BridgeError>;
    }
}

/// Decoder accepting every track except those whose id starts with `bad`.
/// Every load attempt is recorded in `loads`.
pub fn recording_decoder(loads: Arc<Mutex<Vec<String>>>) -> MockDecoder {
    let mut decoder = MockDecoder::new();
    decoder.expect_load_track().returning(move |track| {
        loads.lock().push(track.track_id.clone());
        if track.track_id.starts_with("bad") {
            Err(BridgeError::Rejected("Track is not available".into()))
        } else {
            Ok(())
        }
    });
    decoder.expect_unload().returning(|| ());
    decoder.expect_transport_play().returning(|| Ok(()));
    decoder.expect_transport_pause().returning(|| Ok(()));
    decoder
}

#[derive(Default)]
pub struct RecordingAnnouncer {
    pub spoken: Mutex<Vec<String>>,
    pub track_changes: Mutex<Vec<Option<String>>>,
}

impl RecordingAnnouncer {
    pub fn last(&self) -> Option<String> {
        self.spoken.lock().last().cloned()
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.spoken.lock())
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, text: &str, _interrupt: bool) {
        self.spoken.lock().push(text.to_string());
    }

    fn notify_track_changed(&self, display: Option<&str>) {
        self.track_changes.lock().push(display.map(str::to_string));
    }
}

pub struct FakeSearch {
    pub query: String,
    pub suggestion: Option<String>,
    pub closes: Arc<AtomicUsize>,
}

impl SearchSession for FakeSearch {
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

pub struct Fixture {
    pub service: CoreService,
    pub announcer: Arc<RecordingAnnouncer>,
    pub loads: Arc<Mutex<Vec<String>>>,
}

pub fn fixture_with(configure: impl FnOnce(CoreConfigBuilder) -> CoreConfigBuilder) -> Fixture {
    let announcer = Arc::new(RecordingAnnouncer::default());
    let loads = Arc::new(Mutex::new(Vec::new()));
    let builder = CoreConfig::builder()
        .decoder(Arc::new(recording_decoder(Arc::clone(&loads))))
        .announcer(announcer.clone());
    let config = configure(builder).build().unwrap();
    Fixture {
        service: CoreService::new(config).unwrap(),
        announcer,
        loads,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(|builder| builder)
}

pub fn track(id: &str) -> Arc<Track> {
    Arc::new(Track::new(id, id.to_uppercase()).with_artist("Artist"))
}

/// Feed `bytes` for the current track, finish the download and drain it.
pub fn play_through(service: &CoreService, bytes: &[u8]) {
    use core_playback::AudioPull;

    service.audio_data_arrived(bytes);
    service.audio_stream_complete();
    loop {
        match service.pull_audio(1024) {
            AudioPull::Audio(_) => continue,
            AudioPull::Ended(_) => return,
            other => panic!("unexpected pull result {:?}", other),
        }
    }
}
