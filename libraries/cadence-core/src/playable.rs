//! Playable items
//!
//! A playable has a stable identity and metadata that may still be loading
//! when it enters the queue.

use crate::error::{CoreError, Result};
use crate::pending::Pending;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Shown for items whose loading was cancelled
pub const UNAVAILABLE_STRING: &str = "[UNAVAILABLE]";

/// Shown for items whose metadata did not load in time
pub const LOADING_STRING: &str = "Loading...";

/// Upstream catalog a playable comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Spotify,
    YouTube,
    Filebroker,
    Url,
    Local,
}

/// An item that can be placed in the queue
///
/// Implementations must be cheap to share; the queue only ever holds
/// `Arc<dyn Playable>` and never mutates them.
pub trait Playable: Send + Sync + fmt::Debug {
    /// Identifier that is unique together with [`Playable::source`]
    fn id(&self) -> &str;

    fn source(&self) -> Source;

    /// Display text, waiting at most `timeout` for it to load
    fn display(&self, timeout: Duration) -> Result<String>;

    /// Display text if already loaded, `alternative` otherwise
    fn display_now(&self, alternative: &str) -> String;

    /// Duration, waiting at most `timeout` for it to load
    fn duration(&self, timeout: Duration) -> Result<Duration>;

    /// Duration if already loaded, zero otherwise
    fn duration_now(&self) -> Duration;

    fn album_cover_url(&self) -> Option<String> {
        None
    }
}

/// Display text with loading and cancellation mapped to placeholder strings
pub fn display_or_placeholder(playable: &dyn Playable, timeout: Duration) -> String {
    match playable.display(timeout) {
        Ok(display) => display,
        Err(CoreError::MetadataTimeout) => LOADING_STRING.to_string(),
        Err(_) => UNAVAILABLE_STRING.to_string(),
    }
}

/// Duration with loading and cancellation mapped to zero
pub fn duration_or_zero(playable: &dyn Playable, timeout: Duration) -> Duration {
    playable.duration(timeout).unwrap_or(Duration::ZERO)
}

/// Metadata populated for a track once it is loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: Option<String>,
    pub duration: Duration,
}

impl TrackMetadata {
    pub fn new(title: impl Into<String>, artist: Option<String>, duration: Duration) -> Self {
        Self {
            title: title.into(),
            artist,
            duration,
        }
    }

    /// "Artist - Title" or just the title
    pub fn display(&self) -> String {
        match &self.artist {
            Some(artist) => format!("{} - {}", artist, self.title),
            None => self.title.clone(),
        }
    }
}

/// Concrete playable backed by a pending metadata cell
#[derive(Debug)]
pub struct Track {
    id: String,
    source: Source,
    metadata: Pending<TrackMetadata>,
    album_cover_url: Option<String>,
}

impl Track {
    /// Create a track whose metadata is already known
    pub fn resolved(id: impl Into<String>, source: Source, metadata: TrackMetadata) -> Self {
        Self {
            id: id.into(),
            source,
            metadata: Pending::resolved(metadata),
            album_cover_url: None,
        }
    }

    /// Create a track whose metadata will be completed later
    pub fn pending(id: impl Into<String>, source: Source) -> Self {
        Self {
            id: id.into(),
            source,
            metadata: Pending::new(),
            album_cover_url: None,
        }
    }

    pub fn with_album_cover(mut self, url: impl Into<String>) -> Self {
        self.album_cover_url = Some(url.into());
        self
    }

    /// Share this track as a queue element
    pub fn into_playable(self) -> Arc<dyn Playable> {
        Arc::new(self)
    }

    /// Metadata cell, completed by background loaders
    pub fn metadata(&self) -> &Pending<TrackMetadata> {
        &self.metadata
    }
}

impl Playable for Track {
    fn id(&self) -> &str {
        &self.id
    }

    fn source(&self) -> Source {
        self.source
    }

    fn display(&self, timeout: Duration) -> Result<String> {
        self.metadata
            .get_timeout(timeout)
            .map(|metadata| metadata.display())
    }

    fn display_now(&self, alternative: &str) -> String {
        match self.metadata.get_now() {
            Some(Ok(metadata)) => metadata.display(),
            Some(Err(_)) => UNAVAILABLE_STRING.to_string(),
            None => alternative.to_string(),
        }
    }

    fn duration(&self, timeout: Duration) -> Result<Duration> {
        self.metadata
            .get_timeout(timeout)
            .map(|metadata| metadata.duration)
    }

    fn duration_now(&self) -> Duration {
        match self.metadata.get_now() {
            Some(Ok(metadata)) => metadata.duration,
            _ => Duration::ZERO,
        }
    }

    fn album_cover_url(&self) -> Option<String> {
        self.album_cover_url.clone()
    }
}
