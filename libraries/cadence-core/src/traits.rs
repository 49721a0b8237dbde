/// Core traits for Cadence
use crate::container::Container;
use crate::error::Result;
use crate::playable::Playable;
use std::sync::Arc;

/// Resolves containers into playables
///
/// Implementers talk to upstream catalogs and may block on network I/O, so
/// the queue always calls them before taking its lock. Playables may be
/// returned with their metadata still loading.
pub trait PlayableFactory: Send + Sync {
    /// Resolve one container into its ordered playables
    ///
    /// # Errors
    /// Returns an error if the upstream catalog cannot be reached or the
    /// container no longer exists
    fn resolve(&self, container: &Container) -> Result<Vec<Arc<dyn Playable>>>;

    /// Resolve a batch of containers into one flat list, in container order
    fn load_all(&self, containers: &[Container]) -> Result<Vec<Arc<dyn Playable>>>
    where
        Self: Sized,
    {
        let mut playables = Vec::new();
        for container in containers {
            playables.extend(container.resolve(self)?);
        }
        Ok(playables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Listing;
    use crate::playable::{Source, Track, TrackMetadata};
    use std::time::Duration;

    struct EchoFactory;

    impl PlayableFactory for EchoFactory {
        fn resolve(&self, container: &Container) -> Result<Vec<Arc<dyn Playable>>> {
            let id = container.listing().map(|l| l.id.clone()).unwrap_or_default();
            Ok((0..2)
                .map(|i| {
                    Track::resolved(
                        format!("{}/{}", id, i),
                        Source::Filebroker,
                        TrackMetadata::new("Song", None, Duration::from_secs(60)),
                    )
                    .into_playable()
                })
                .collect())
        }
    }

    #[test]
    fn load_all_flattens_in_container_order() {
        let single = Track::pending("solo", Source::Url).into_playable();
        let containers = vec![
            Container::Playlist(Listing::new("p", "Mix")),
            Container::Single(single),
            Container::SearchResult(Listing::new("s", "query")),
        ];

        let playables = EchoFactory.load_all(&containers).unwrap();
        let ids: Vec<&str> = playables.iter().map(|p| p.id()).collect();

        assert_eq!(ids, vec!["p/0", "p/1", "solo", "s/0", "s/1"]);
    }
}
