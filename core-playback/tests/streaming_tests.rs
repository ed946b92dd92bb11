//! Streaming buffer behaviour under a producer thread and a polling consumer.

use core_playback::streaming::{AppendOutcome, Generation, ReadOutcome, StreamingBuffer};
use std::thread;

fn drain(buffer: &StreamingBuffer, chunk: usize) -> (Vec<u8>, usize) {
    let mut out = Vec::new();
    let mut pending_polls = 0;
    loop {
        match buffer.read(chunk) {
            ReadOutcome::Data(bytes) => out.extend_from_slice(&bytes),
            ReadOutcome::Pending => {
                pending_polls += 1;
                thread::yield_now();
            }
            ReadOutcome::EndOfStream => return (out, pending_polls),
        }
    }
}

#[test]
fn test_drains_exactly_what_was_written_in_order() {
    let buffer = StreamingBuffer::new(Generation(7));
    let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

    for chunk in payload.chunks(333) {
        assert_eq!(buffer.append(chunk), AppendOutcome::Accepted(chunk.len()));
    }
    buffer.mark_complete();

    let (out, _) = drain(&buffer, 1024);
    assert_eq!(out, payload);
    assert_eq!(buffer.written(), payload.len());
    assert_eq!(buffer.read_position(), payload.len());
}

#[test]
fn test_end_of_stream_only_when_complete_and_drained() {
    let buffer = StreamingBuffer::new(Generation(1));
    buffer.append(&[1, 2, 3]);
    assert!(matches!(buffer.read(3), ReadOutcome::Data(_)));
    // drained but not complete
    assert_eq!(buffer.read(3), ReadOutcome::Pending);

    buffer.append(&[4]);
    buffer.mark_complete();
    // complete but not drained
    assert!(matches!(buffer.read(3), ReadOutcome::Data(_)));
    assert_eq!(buffer.read(3), ReadOutcome::EndOfStream);
}

#[test]
fn test_concurrent_producer_and_consumer() {
    let buffer = StreamingBuffer::new(Generation(2));
    let producer = buffer.clone();
    let payload: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
    let expected = payload.clone();

    let handle = thread::spawn(move || {
        for chunk in payload.chunks(997) {
            producer.append(chunk);
            thread::yield_now();
        }
        producer.mark_complete();
    });

    let (out, _) = drain(&buffer, 512);
    handle.join().unwrap();
    assert_eq!(out, expected);
    assert_eq!(buffer.anomalies(), 0);
}

#[test]
fn test_late_append_after_retire_does_not_reach_consumer() {
    let buffer = StreamingBuffer::new(Generation(3));
    buffer.append(b"old track");
    buffer.retire();
    assert_eq!(buffer.append(b"still old"), AppendOutcome::Retired);
    assert_eq!(buffer.read(64), ReadOutcome::EndOfStream);
}
