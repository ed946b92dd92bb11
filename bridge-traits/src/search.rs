//! Search session handle.
//!
//! A backend search keeps resources alive (result pointers, a native browse
//! object) for as long as the results are on screen. The buffer that shows
//! the results owns the session and closes it when the buffer goes away.

use crate::platform::PlatformSendSync;

pub trait SearchSession: PlatformSendSync {
    /// The text the user searched for.
    fn query(&self) -> &str;

    /// Spelling suggestion offered by the backend, if any.
    fn did_you_mean(&self) -> Option<String> {
        None
    }

    /// Release backend resources. Called exactly once by the owning buffer.
    fn close(&mut self);
}
