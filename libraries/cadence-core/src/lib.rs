//! Cadence Core
//!
//! Contracts for the collaborators the Cadence playback queue consumes.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Playables**: the `Playable` trait and the concrete `Track`, whose
//!   metadata is populated lazily through a `Pending` cell
//! - **Containers**: the closed `Container` enum (single item, playlist,
//!   album, search result, collection) with cached resolution
//! - **Factory**: the `PlayableFactory` trait that resolves containers
//! - **Error Handling**: `CoreError` and `Result`
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{Playable, Source, Track, TrackMetadata};
//! use std::time::Duration;
//!
//! let track = Track::pending("yt:abc", Source::YouTube);
//! assert_eq!(track.display_now("Loading..."), "Loading...");
//!
//! track
//!     .metadata()
//!     .complete(TrackMetadata::new("Song", None, Duration::from_secs(200)));
//! assert_eq!(track.display(Duration::from_millis(100)).unwrap(), "Song");
//! ```

#![forbid(unsafe_code)]

pub mod container;
pub mod error;
pub mod pending;
pub mod playable;
pub mod traits;

// Re-export commonly used types
pub use container::{Container, ContainerKind, Listing};
pub use error::{CoreError, Result};
pub use pending::Pending;
pub use playable::{
    display_or_placeholder, duration_or_zero, Playable, Source, Track, TrackMetadata,
    LOADING_STRING, UNAVAILABLE_STRING,
};
pub use traits::PlayableFactory;
