//! Presentation snapshot of the queue
//!
//! Playables around the current one are captured under the read lock;
//! their metadata is read afterwards with a bounded timeout, so a slow
//! lookup never holds up writers.

use crate::config::{QueueConfig, TRUNCATION_MARKER};
use crate::error::Result;
use crate::queue::Queue;
use crate::types::{PlaybackStatus, RepeatMode};
use cadence_core::{display_or_placeholder, duration_or_zero, Playable};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// One queued track as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackLine {
    pub display: String,
    pub duration: Duration,
}

/// The playing track with playback progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentTrack {
    pub display: String,
    pub position: Duration,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueSnapshot {
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_shuffle: bool,
    pub repeat: RepeatMode,
    pub volume: u8,
    pub size: usize,
    pub position: Option<usize>,

    /// More tracks precede the listed previous ones
    pub more_previous: bool,
    pub previous: Vec<TrackLine>,
    pub current: Option<CurrentTrack>,
    pub next: Vec<TrackLine>,

    /// More tracks follow the listed next ones
    pub more_next: bool,
    pub thumbnail_url: Option<String>,
}

struct Captured {
    is_shuffle: bool,
    repeat: RepeatMode,
    size: usize,
    position: Option<usize>,
    previous: Vec<Arc<dyn Playable>>,
    current: Option<Arc<dyn Playable>>,
    next: Vec<Arc<dyn Playable>>,
}

impl Queue {
    /// Build a presentation snapshot
    pub fn snapshot(&self, status: &PlaybackStatus, config: &QueueConfig) -> Result<QueueSnapshot> {
        let captured = {
            let state = self.read();
            let size = state.size();
            let position = state.position();
            let lookaround = config.lookaround;

            let previous = match position {
                Some(pos) if pos > 0 => state.list_prev(lookaround)?,
                _ => Vec::new(),
            };
            let next = if size > 0 && !position.is_some_and(|pos| pos + 1 >= size) {
                state.list_next(lookaround)?
            } else {
                Vec::new()
            };

            Captured {
                is_shuffle: state.is_shuffle(),
                repeat: state.repeat_mode(),
                size,
                position,
                previous,
                current: position.map(|_| state.current()).transpose()?,
                next,
            }
        };

        let timeout = config.metadata_timeout();
        let line = |playable: &Arc<dyn Playable>| TrackLine {
            display: truncate(display_or_placeholder(playable.as_ref(), timeout), config.display_max_len),
            duration: duration_or_zero(playable.as_ref(), timeout),
        };

        let lookaround = config.lookaround;
        let shown = captured.position.map_or(0, |pos| pos + 1);
        let thumbnail_url = captured.current.as_ref().and_then(|current| {
            current
                .album_cover_url()
                .or_else(|| config.default_thumbnail_url.clone())
        });

        Ok(QueueSnapshot {
            is_playing: status.is_playing,
            is_paused: status.is_paused,
            is_shuffle: captured.is_shuffle,
            repeat: captured.repeat,
            volume: status.volume,
            size: captured.size,
            position: captured.position,
            more_previous: captured.position.is_some_and(|pos| pos > lookaround),
            previous: captured.previous.iter().map(line).collect(),
            current: captured.current.as_ref().map(|current| CurrentTrack {
                display: truncate(
                    display_or_placeholder(current.as_ref(), timeout),
                    config.display_max_len,
                ),
                position: status.position,
                duration: duration_or_zero(current.as_ref(), timeout),
            }),
            next: captured.next.iter().map(line).collect(),
            more_next: !captured.next.is_empty() && captured.size > shown + lookaround,
            thumbnail_url,
        })
    }
}

/// Cut `display` to `max_len` characters, marking the cut
fn truncate(display: String, max_len: usize) -> String {
    if display.chars().count() <= max_len {
        return display;
    }
    let keep = max_len.saturating_sub(TRUNCATION_MARKER.len());
    let mut truncated: String = display.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

impl fmt::Display for QueueSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.is_playing {
            flags.push("playing".to_string());
        }
        if self.is_paused {
            flags.push("paused".to_string());
        }
        if self.is_shuffle {
            flags.push("shuffle".to_string());
        }
        match self.repeat {
            RepeatMode::All => flags.push("repeat".to_string()),
            RepeatMode::One => flags.push("repeat one".to_string()),
            RepeatMode::Off => {}
        }
        flags.push(format!("volume {}", self.volume));
        writeln!(f, "{}", flags.join(" | "))?;

        let Some(current) = &self.current else {
            return write!(f, "(empty)");
        };

        if !self.previous.is_empty() {
            writeln!(f, "Previous:")?;
            if self.more_previous {
                writeln!(f, "...")?;
            }
            for track in &self.previous {
                writeln!(f, "{} - {}", track.display, format_duration(track.duration))?;
            }
        }

        writeln!(
            f,
            "Current:\n| {} - {} / {}",
            current.display,
            format_duration(current.position),
            format_duration(current.duration)
        )?;

        if !self.next.is_empty() {
            writeln!(f, "Next:")?;
            for track in &self.next {
                writeln!(f, "{} - {}", track.display, format_duration(track.duration))?;
            }
            if self.more_next {
                writeln!(f, "...")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_display_is_truncated() {
        let long = "x".repeat(120);
        let truncated = truncate(long, 100);
        assert_eq!(truncated.chars().count(), 100);
        assert!(truncated.ends_with("[...]"));

        assert_eq!(truncate("short".to_string(), 100), "short");
        assert_eq!(truncate("y".repeat(100), 100), "y".repeat(100));
    }

    #[test]
    fn durations_use_minutes_and_hours() {
        assert_eq!(format_duration(Duration::from_secs(65)), "1:05");
        assert_eq!(format_duration(Duration::from_secs(3725)), "1:02:05");
        assert_eq!(format_duration(Duration::ZERO), "0:00");
    }
}
