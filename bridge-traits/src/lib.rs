//! # Host Bridge Traits
//!
//! Abstraction traits the host application implements so the core can stay
//! free of any particular decoder library or screen reader API.
//!
//! ## Overview
//!
//! Each trait represents a capability the core needs but cannot provide
//! itself. The host wires concrete implementations in through
//! `core_runtime::config::CoreConfig`.
//!
//! ## Traits
//!
//! ### Playback
//! - [`DecoderSession`](playback::DecoderSession) - Load/unload tracks and drive the decoder transport
//!
//! ### Output
//! - [`Announcer`](output::Announcer) - Speech output and now-playing status
//!
//! ### Browsing
//! - [`SearchSession`](search::SearchSession) - Disposable handle for open search results
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with a descriptive error when a required capability is
//! missing:
//!
//! ```ignore
//! let decoder = self.decoder.ok_or_else(|| Error::CapabilityMissing {
//!     capability: "DecoderSession".to_string(),
//!     message: "Inject the host's streaming backend.".to_string(),
//! })?;
//! ```
//!
//! ## Error Handling
//!
//! All fallible bridge calls use [`BridgeError`](error::BridgeError).
//! Implementations should convert backend error codes into
//! `BridgeError::Rejected` with a message fit to be read aloud.
//!
//! ## Thread Safety
//!
//! Bridges are called from both the command thread and the decoder callback
//! thread, so every trait requires [`PlatformSendSync`](platform::PlatformSendSync).

pub mod error;
pub mod output;
pub mod platform;
pub mod playback;
pub mod search;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use output::{Announcer, SilentAnnouncer};
pub use playback::{DecoderSession, TrackRequest};
pub use search::SearchSession;
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
