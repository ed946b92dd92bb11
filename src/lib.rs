//! Workspace placeholder crate.
//!
//! This crate exposes a single `service` feature that maps to the individual
//! workspace crates (`core-service`, `core-buffers`, `core-playback`). Host
//! applications can depend on `blindspot-workspace` and reach the engine
//! without wiring each crate individually.

#[cfg(feature = "service")]
pub use core_buffers as buffers;
#[cfg(feature = "service")]
pub use core_playback as playback;
#[cfg(feature = "service")]
pub use core_service as service;
