//! # Core Configuration Module
//!
//! Provides configuration management for the Blindspot core.
//!
//! ## Overview
//!
//! A builder assembles a [`CoreConfig`] holding the host bridges and the
//! user-tunable settings. Validation is fail-fast: a missing bridge or an
//! out-of-range setting is reported at build time, not on the first command.
//!
//! ## Required Dependencies
//!
//! - `DecoderSession` - the streaming/decoding backend
//! - `Announcer` - speech and now-playing output
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `Clock` - timestamps for playback history (default: `SystemClock`)
//!
//! ## Settings
//!
//! [`NavigationSettings`], [`PlaybackSettings`] and [`QueuePolicy`] are plain
//! serde structs. Persisting them is the host's job; [`CoreSettings::from_json`]
//! accepts whatever the host stored, filling gaps with defaults.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CoreConfig, QueuePolicy};
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .decoder(Arc::new(MyDecoder::new()))
//!     .announcer(Arc::new(MyScreenReader::new()))
//!     .queue_policy(QueuePolicy { skip_unplayable: true, max_consecutive_skips: 3 })
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Panics: no decoder or announcer was provided
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing required bridges");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{Announcer, Clock, DecoderSession, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default number of items moved by a jump command.
pub const DEFAULT_JUMP_SIZE: usize = 10;

/// Default volume step used by the volume up/down commands.
pub const DEFAULT_VOLUME_STEP: f32 = 0.05;

/// Default number of played tracks remembered.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Default backstop for the skip-unplayable policy.
pub const DEFAULT_MAX_CONSECUTIVE_SKIPS: u32 = 5;

// ============================================================================
// Settings
// ============================================================================

/// Cursor movement settings shared by every buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    /// Items moved by the jump commands.
    pub jump_size: usize,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            jump_size: DEFAULT_JUMP_SIZE,
        }
    }
}

/// Playback coordinator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Volume at startup, `0.0..=1.0`.
    pub initial_volume: f32,
    /// Amount added or removed by one volume command.
    pub volume_step: f32,
    /// Played tracks to remember. `None` keeps everything.
    pub history_limit: Option<usize>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            initial_volume: 1.0,
            volume_step: DEFAULT_VOLUME_STEP,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
        }
    }
}

/// What the play queue does when a track refuses to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueuePolicy {
    /// Drop unplayable tracks and try the next one instead of stopping.
    pub skip_unplayable: bool,
    /// Give up after this many failures in a row.
    pub max_consecutive_skips: u32,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            skip_unplayable: false,
            max_consecutive_skips: DEFAULT_MAX_CONSECUTIVE_SKIPS,
        }
    }
}

/// All user-tunable settings in one serializable bundle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreSettings {
    pub navigation: NavigationSettings,
    pub playback: PlaybackSettings,
    pub queue: QueuePolicy,
}

impl CoreSettings {
    /// Parse settings persisted by the host. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: CoreSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.navigation.jump_size == 0 {
            return Err(Error::Config(
                "Jump size must be at least 1 item".to_string(),
            ));
        }

        let volume = self.playback.initial_volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(Error::Config(format!(
                "Initial volume {} is outside 0.0..=1.0",
                volume
            )));
        }

        let step = self.playback.volume_step;
        if !(step > 0.0 && step <= 1.0) {
            return Err(Error::Config(format!(
                "Volume step {} must be greater than 0.0 and at most 1.0",
                step
            )));
        }

        if self.queue.skip_unplayable && self.queue.max_consecutive_skips == 0 {
            return Err(Error::Config(
                "Skipping unplayable tracks is enabled but max_consecutive_skips is 0. \
                 Disable skipping or allow at least one skip."
                    .to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// CoreConfig
// ============================================================================

/// Core configuration for the Blindspot engine.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Streaming/decoding backend (required)
    pub decoder: Arc<dyn DecoderSession>,

    /// Speech and status output (required)
    pub announcer: Arc<dyn Announcer>,

    /// Time source for playback history
    pub clock: Arc<dyn Clock>,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    pub settings: CoreSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("decoder", &"DecoderSession { ... }")
            .field("announcer", &"Announcer { ... }")
            .field("clock", &"Clock { ... }")
            .field("event_buffer_size", &self.event_buffer_size)
            .field("settings", &self.settings)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        self.settings.validate()
    }
}

fn decoder_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "DecoderSession".to_string(),
        message: "A DecoderSession implementation is required to stream tracks. \
                 Inject the host's streaming backend with .decoder()."
            .to_string(),
    }
}

fn announcer_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "Announcer".to_string(),
        message: "An Announcer implementation is required for speech output. \
                 Inject the host's screen reader adapter with .announcer(), \
                 or SilentAnnouncer for headless use."
            .to_string(),
    }
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    decoder: Option<Arc<dyn DecoderSession>>,
    announcer: Option<Arc<dyn Announcer>>,
    clock: Option<Arc<dyn Clock>>,
    event_buffer_size: Option<usize>,
    settings: CoreSettings,
}

impl CoreConfigBuilder {
    /// Sets the decoder backend (required).
    pub fn decoder(mut self, decoder: Arc<dyn DecoderSession>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Sets the speech/status output (required).
    pub fn announcer(mut self, announcer: Arc<dyn Announcer>) -> Self {
        self.announcer = Some(announcer);
        self
    }

    /// Sets the clock. Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the event bus capacity.
    ///
    /// Default: 100 events
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Replaces all settings at once, e.g. with values loaded via
    /// [`CoreSettings::from_json`].
    pub fn settings(mut self, settings: CoreSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn navigation(mut self, navigation: NavigationSettings) -> Self {
        self.settings.navigation = navigation;
        self
    }

    pub fn playback(mut self, playback: PlaybackSettings) -> Self {
        self.settings.playback = playback;
        self
    }

    pub fn queue_policy(mut self, policy: QueuePolicy) -> Self {
        self.settings.queue = policy;
        self
    }

    /// Shorthand for toggling [`QueuePolicy::skip_unplayable`].
    pub fn skip_unplayable(mut self, enabled: bool) -> Self {
        self.settings.queue.skip_unplayable = enabled;
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` if the decoder or announcer was not provided
    /// - `Config` if any setting is out of range
    pub fn build(self) -> Result<CoreConfig> {
        let decoder = self.decoder.ok_or_else(decoder_missing_error)?;
        let announcer = self.announcer.ok_or_else(announcer_missing_error)?;

        let config = CoreConfig {
            decoder,
            announcer,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            settings: self.settings,
        };

        config.validate()?;

        Ok(config)
    }
}
