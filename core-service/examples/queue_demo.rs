//! # Play Queue Walkthrough
//!
//! Drives the service with a fake decoder that accepts everything, prints
//! what would be spoken, and plays a small queue to the end.
//!
//! Run with: `cargo run --example queue_demo --package core-service`

use anyhow::Result;
use bridge_traits::{Announcer, DecoderSession, TrackRequest};
use core_buffers::{Playlist, Track};
use core_playback::AudioPull;
use core_runtime::config::CoreConfig;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_service::{Command, CoreService};
use std::sync::Arc;

struct PrintingDecoder;

impl DecoderSession for PrintingDecoder {
    fn load_track(&self, track: &TrackRequest) -> bridge_traits::error::Result<()> {
        println!("  [decoder] load {}", track.track_id);
        Ok(())
    }

    fn unload(&self) {
        println!("  [decoder] unload");
    }

    fn transport_play(&self) -> bridge_traits::error::Result<()> {
        Ok(())
    }

    fn transport_pause(&self) -> bridge_traits::error::Result<()> {
        Ok(())
    }
}

struct PrintingAnnouncer;

impl Announcer for PrintingAnnouncer {
    fn announce(&self, text: &str, _interrupt: bool) {
        println!("  [speech] {}", text);
    }

    fn notify_track_changed(&self, display: Option<&str>) {
        println!("  [title] {}", display.unwrap_or("-"));
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default().with_format(LogFormat::Compact))?;

    let config = CoreConfig::builder()
        .decoder(Arc::new(PrintingDecoder))
        .announcer(Arc::new(PrintingAnnouncer))
        .build()?;
    let service = CoreService::new(config)?;

    let mix = Playlist::new("pl:1", "Evening mix").with_tracks([
        Track::new("t:1", "Intro").with_artist("Band"),
        Track::new("t:2", "Middle").with_artist("Band"),
        Track::new("t:3", "Outro").with_artist("Band"),
    ]);
    service.load_playlists(vec![Arc::new(mix)]);

    println!("Open the playlist and start the second track:");
    for command in [
        Command::ActivateBufferItem,
        Command::NextBufferItem,
        Command::ActivateBufferItem,
    ] {
        service.execute(command)?;
    }

    println!("Queue the last track after it:");
    service.execute(Command::NextBufferItem)?;
    service.enqueue_current_item(false)?;

    println!("Play until the queue runs out:");
    while service.snapshot().playing.is_some() {
        service.audio_data_arrived(&[0u8; 4096]);
        service.audio_stream_complete();
        loop {
            match service.pull_audio(1024) {
                AudioPull::Audio(chunk) => println!("  [sink] {} bytes", chunk.len()),
                AudioPull::Ended(ended) => {
                    println!("  [sink] {} ended", ended.track.title);
                    break;
                }
                _ => break,
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&service.snapshot())?);
    Ok(())
}
