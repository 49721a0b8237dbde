//! Cadence - Playback Queue
//!
//! Concurrent playback queue for Cadence.
//!
//! This crate provides:
//! - Fragments: the playables of one container, inserted together
//! - Fracturing: fragments split in place when content lands inside them
//! - Sequential and shuffled orderings over the same fragments
//! - Riffle shuffle that keeps the current track playing
//! - Repeat modes (Off, All, One)
//! - A single reader/writer lock with guard-scoped transactions
//! - Presentation snapshots (previous/current/next tracks)
//!
//! # Architecture
//!
//! The queue never copies playables. Fragments live in a per-queue store
//! and both node lists reference them by handle. Container resolution and
//! metadata loading happen outside the lock.
//!
//! # Example: Basic Queue
//!
//! ```rust
//! use cadence_core::{ContainerKind, Source, Track, TrackMetadata};
//! use cadence_queue::{Fragment, Queue};
//! use std::time::Duration;
//!
//! let queue = Queue::new();
//!
//! let track = |id: &str| {
//!     Track::resolved(id, Source::Local, TrackMetadata::new(id, None, Duration::from_secs(180)))
//!         .into_playable()
//! };
//!
//! // First insertion starts playback at index 0
//! queue.add(Fragment::multi(ContainerKind::Album, vec![track("a"), track("b")])?)?;
//! assert_eq!(queue.position(), Some(0));
//!
//! // Insert a single track right after the current one
//! queue.insert_next(Fragment::single(track("c")))?;
//! assert_eq!(queue.iterate()?.id(), "c");
//! # Ok::<(), cadence_queue::QueueError>(())
//! ```
//!
//! # Example: Shuffle and Repeat
//!
//! ```rust
//! use cadence_queue::{Queue, RepeatMode};
//!
//! let queue = Queue::new();
//!
//! queue.set_shuffle(true)?;
//! queue.set_repeat_mode(RepeatMode::All);
//! # Ok::<(), cadence_queue::QueueError>(())
//! ```
//!
//! # Example: Transactions
//!
//! ```rust
//! use cadence_core::{Source, Track, TrackMetadata};
//! use cadence_queue::{Fragment, Queue};
//! use std::time::Duration;
//!
//! let queue = Queue::new();
//! let track = Track::resolved("a", Source::Local, TrackMetadata::new("a", None, Duration::ZERO));
//!
//! // Clear and insert under one write lock
//! let mut state = queue.write();
//! state.clear(false)?;
//! state.add(Fragment::single(track.into_playable()))?;
//! # Ok::<(), cadence_queue::QueueError>(())
//! ```

mod arena;
pub mod config;
mod error;
pub mod fragment;
mod node_list;
mod queue;
mod shuffle;
pub mod snapshot;
pub mod types;

// Public exports
pub use config::QueueConfig;
pub use error::{QueueError, Result};
pub use fragment::{Fragment, FragmentId, FragmentStore, MultiFragment, SingleFragment};
pub use queue::{Queue, QueueState};
pub use snapshot::{CurrentTrack, QueueSnapshot, TrackLine};
pub use types::{PlaybackStatus, RepeatMode, View};
