//! Containers: unresolved sources of one or more playables
//!
//! The set of container kinds is closed, so they are modelled as an enum
//! rather than a trait object. Multi-item kinds cache their resolution.

use crate::error::Result;
use crate::playable::Playable;
use crate::traits::PlayableFactory;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Kind of a container, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Single,
    Playlist,
    Album,
    SearchResult,
    Collection,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerKind::Single => "track",
            ContainerKind::Playlist => "playlist",
            ContainerKind::Album => "album",
            ContainerKind::SearchResult => "search result",
            ContainerKind::Collection => "collection",
        };
        f.write_str(name)
    }
}

/// Reference to a remote list of playables
#[derive(Debug)]
pub struct Listing {
    pub id: String,
    pub name: String,
    resolved: OnceLock<Vec<Arc<dyn Playable>>>,
}

impl Listing {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resolved: OnceLock::new(),
        }
    }

    /// Listing whose items are already known (e.g. a local collection)
    pub fn preloaded(
        id: impl Into<String>,
        name: impl Into<String>,
        playables: Vec<Arc<dyn Playable>>,
    ) -> Self {
        let listing = Self::new(id, name);
        let _ = listing.resolved.set(playables);
        listing
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }
}

/// An as-yet unresolved source of playables
#[derive(Debug)]
pub enum Container {
    /// A single, already identified item
    Single(Arc<dyn Playable>),
    Playlist(Listing),
    Album(Listing),
    SearchResult(Listing),
    Collection(Listing),
}

impl Container {
    pub fn kind(&self) -> ContainerKind {
        match self {
            Container::Single(_) => ContainerKind::Single,
            Container::Playlist(_) => ContainerKind::Playlist,
            Container::Album(_) => ContainerKind::Album,
            Container::SearchResult(_) => ContainerKind::SearchResult,
            Container::Collection(_) => ContainerKind::Collection,
        }
    }

    /// Listing payload for multi-item kinds
    pub fn listing(&self) -> Option<&Listing> {
        match self {
            Container::Single(_) => None,
            Container::Playlist(listing)
            | Container::Album(listing)
            | Container::SearchResult(listing)
            | Container::Collection(listing) => Some(listing),
        }
    }

    /// Human readable description, e.g. `album 'Blue'`
    pub fn describe(&self) -> String {
        match self {
            Container::Single(playable) => format!("track '{}'", playable.id()),
            _ => {
                let name = self.listing().map_or("", |listing| listing.name.as_str());
                format!("{} '{}'", self.kind(), name)
            }
        }
    }

    /// Resolve to an ordered list of playables
    ///
    /// Listings call the factory once and serve later calls from the cache.
    pub fn resolve(&self, factory: &dyn PlayableFactory) -> Result<Vec<Arc<dyn Playable>>> {
        let listing = match self {
            Container::Single(playable) => return Ok(vec![Arc::clone(playable)]),
            Container::Playlist(listing)
            | Container::Album(listing)
            | Container::SearchResult(listing)
            | Container::Collection(listing) => listing,
        };

        if let Some(cached) = listing.resolved.get() {
            return Ok(cached.clone());
        }

        let playables = factory.resolve(self)?;
        debug!(
            "Resolved {} to {} playables",
            self.describe(),
            playables.len()
        );
        // A concurrent resolver may have won the race; both results are equivalent.
        let _ = listing.resolved.set(playables);
        Ok(listing.resolved.get().cloned().unwrap_or_default())
    }
}
