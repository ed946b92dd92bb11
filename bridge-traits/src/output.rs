//! Speech and status output bridge.
//!
//! The host owns the screen reader API and any tray/status surface. The core
//! only ever pushes text out through [`Announcer`].

use crate::platform::PlatformSendSync;

/// Receives everything the core wants the user to hear or see.
pub trait Announcer: PlatformSendSync {
    /// Speak `text`. When `interrupt` is true, any speech in progress is cut
    /// off first.
    fn announce(&self, text: &str, interrupt: bool);

    /// The playing track changed. `None` means nothing is playing.
    ///
    /// Used for tray tooltips and window titles, separate from speech.
    fn notify_track_changed(&self, display: Option<&str>);
}

/// Announcer that discards everything. Handy for headless hosts.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn announce(&self, _text: &str, _interrupt: bool) {}

    fn notify_track_changed(&self, _display: Option<&str>) {}
}
