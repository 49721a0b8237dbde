//! Core types for queue management

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RepeatMode {
    /// Stop when queue ends
    #[default]
    Off,

    /// Loop entire queue
    All,

    /// Loop current track only (handled by the player loop)
    One,
}

impl RepeatMode {
    /// Whether any repeat mode is active
    pub fn is_repeating(self) -> bool {
        self != RepeatMode::Off
    }
}

/// Coordinate space of a node list
///
/// Sequential coordinates are offsets into a fragment's original item
/// order; shuffled coordinates are positions in its permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Sequential,
    Shuffled,
}

/// Playback state reported by the audio pipeline, used for snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub is_playing: bool,
    pub is_paused: bool,

    /// Volume (0-100)
    pub volume: u8,

    /// Position within the current track
    pub position: Duration,
}

impl Default for PlaybackStatus {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_paused: false,
            volume: 100,
            position: Duration::ZERO,
        }
    }
}
