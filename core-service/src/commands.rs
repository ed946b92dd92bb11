//! Named user commands, as bound to hotkeys by the host.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    NextBuffer,
    PreviousBuffer,
    NextBufferItem,
    PreviousBufferItem,
    FirstBufferItem,
    LastBufferItem,
    NextBufferItemJump,
    PreviousBufferItemJump,
    ActivateBufferItem,
    PlaybackVolumeUp,
    PlaybackVolumeDown,
    DismissBuffer,
    AnnounceNowPlaying,
}

impl Command {
    pub const ALL: [Command; 13] = [
        Command::NextBuffer,
        Command::PreviousBuffer,
        Command::NextBufferItem,
        Command::PreviousBufferItem,
        Command::FirstBufferItem,
        Command::LastBufferItem,
        Command::NextBufferItemJump,
        Command::PreviousBufferItemJump,
        Command::ActivateBufferItem,
        Command::PlaybackVolumeUp,
        Command::PlaybackVolumeDown,
        Command::DismissBuffer,
        Command::AnnounceNowPlaying,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::NextBuffer => "next_buffer",
            Command::PreviousBuffer => "previous_buffer",
            Command::NextBufferItem => "next_buffer_item",
            Command::PreviousBufferItem => "previous_buffer_item",
            Command::FirstBufferItem => "first_buffer_item",
            Command::LastBufferItem => "last_buffer_item",
            Command::NextBufferItemJump => "next_buffer_item_jump",
            Command::PreviousBufferItemJump => "previous_buffer_item_jump",
            Command::ActivateBufferItem => "activate_buffer_item",
            Command::PlaybackVolumeUp => "playback_volume_up",
            Command::PlaybackVolumeDown => "playback_volume_down",
            Command::DismissBuffer => "dismiss_buffer",
            Command::AnnounceNowPlaying => "announce_now_playing",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Command::ALL
            .iter()
            .copied()
            .find(|command| command.name() == name)
            .ok_or_else(|| CoreError::UnknownCommand(name.to_string()))
    }
}
