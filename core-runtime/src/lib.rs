//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the Blindspot core:
//! - Logging and tracing infrastructure
//! - Configuration management (bridges plus user-tunable settings)
//! - Event bus system
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the buffer, playback and service
//! crates depend on. It establishes the logging conventions, the fail-fast
//! configuration builder, and the typed broadcast channel used to observe
//! playback and queue activity.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
