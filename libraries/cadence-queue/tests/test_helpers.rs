#![allow(dead_code)]

use cadence_core::{ContainerKind, Playable, Source, Track, TrackMetadata};
use cadence_queue::{Fragment, Queue};
use std::sync::{Arc, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

pub fn create_track(id: &str) -> Arc<dyn Playable> {
    Track::resolved(
        id,
        Source::Local,
        TrackMetadata::new(
            format!("Title {}", id),
            Some("Test Artist".to_string()),
            Duration::from_secs(180),
        ),
    )
    .into_playable()
}

pub fn create_single(id: &str) -> Fragment {
    Fragment::single(create_track(id))
}

/// Album fragment with tracks `{prefix}0`, `{prefix}1`, ...
pub fn create_album(prefix: &str, size: usize) -> Fragment {
    let tracks = (0..size)
        .map(|i| create_track(&format!("{}{}", prefix, i)))
        .collect();
    Fragment::multi(ContainerKind::Album, tracks).unwrap()
}

pub fn ids(tracks: &[Arc<dyn Playable>]) -> Vec<String> {
    tracks.iter().map(|t| t.id().to_string()).collect()
}

pub fn queue_ids(queue: &Queue) -> Vec<String> {
    ids(&queue.get_tracks().unwrap())
}

pub fn current_id(queue: &Queue) -> String {
    queue.get_current().unwrap().id().to_string()
}
