//! Fragment holding several playables from one container
//!
//! The playables are fixed at creation. Fracturing and shuffling only
//! change partitions and a permutation view over them; the backing
//! sequence is never copied or reordered.

use super::partition::Partition;
use super::single::SingleFragment;
use crate::error::{QueueError, Result};
use crate::shuffle::{fracture_offsets, permute};
use crate::types::View;
use cadence_core::{ContainerKind, Playable};
use std::ops::Range;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct ShuffleState {
    /// Shuffled position -> original offset
    permutation: Vec<usize>,

    /// Fractures over shuffled positions
    partition: Partition,
}

/// Multi-item fragment (playlist, album, search result, collection)
#[derive(Debug, Clone)]
pub struct MultiFragment {
    playables: Vec<Arc<dyn Playable>>,
    kind: ContainerKind,
    sequential: Partition,
    shuffle: Option<ShuffleState>,

    /// Current item in active view coordinates
    current: Option<usize>,
}

impl MultiFragment {
    pub(crate) fn new(kind: ContainerKind, playables: Vec<Arc<dyn Playable>>) -> Self {
        let sequential = Partition::whole(playables.len());
        Self {
            playables,
            kind,
            sequential,
            shuffle: None,
            current: None,
        }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Number of playables still in the queue
    pub fn size(&self) -> usize {
        self.sequential.len()
    }

    pub fn is_shuffled(&self) -> bool {
        self.shuffle.is_some()
    }

    pub(crate) fn view(&self) -> View {
        if self.shuffle.is_some() {
            View::Shuffled
        } else {
            View::Sequential
        }
    }

    pub(crate) fn partition(&self, view: View) -> Result<&Partition> {
        match view {
            View::Sequential => Ok(&self.sequential),
            View::Shuffled => self
                .shuffle
                .as_ref()
                .map(|state| &state.partition)
                .ok_or_else(|| QueueError::invalid_state("fragment is not shuffled")),
        }
    }

    pub(crate) fn partition_mut(&mut self, view: View) -> Result<&mut Partition> {
        match view {
            View::Sequential => Ok(&mut self.sequential),
            View::Shuffled => self
                .shuffle
                .as_mut()
                .map(|state| &mut state.partition)
                .ok_or_else(|| QueueError::invalid_state("fragment is not shuffled")),
        }
    }

    fn active(&self) -> &Partition {
        self.shuffle
            .as_ref()
            .map_or(&self.sequential, |state| &state.partition)
    }

    /// Original offset of a coordinate in `view`
    pub(crate) fn original_offset(&self, view: View, coord: usize) -> Result<usize> {
        match (view, &self.shuffle) {
            (View::Sequential, _) => Ok(coord),
            (View::Shuffled, Some(state)) => {
                state
                    .permutation
                    .get(coord)
                    .copied()
                    .ok_or(QueueError::IndexOutOfBounds {
                        index: coord,
                        size: state.permutation.len(),
                    })
            }
            (View::Shuffled, None) => Err(QueueError::invalid_state("fragment is not shuffled")),
        }
    }

    pub(crate) fn playable_in_view(&self, view: View, coord: usize) -> Result<Arc<dyn Playable>> {
        let offset = self.original_offset(view, coord)?;
        self.playables
            .get(offset)
            .cloned()
            .ok_or(QueueError::IndexOutOfBounds {
                index: offset,
                size: self.playables.len(),
            })
    }

    fn playable_at(&self, coord: usize) -> Result<Arc<dyn Playable>> {
        self.playable_in_view(self.view(), coord)
    }

    fn playables_in(&self, range: Range<usize>) -> Result<Vec<Arc<dyn Playable>>> {
        range.map(|coord| self.playable_at(coord)).collect()
    }

    /// Fractures in ascending offset order, in the active view
    pub fn ordered_fractures(&self) -> Vec<Range<usize>> {
        self.active().ordered().collect()
    }

    /// Split at `offset`; returns the index of the new fracture
    pub fn add_fracture(&mut self, offset: usize) -> Result<usize> {
        let view = self.view();
        self.partition_mut(view)?.split(offset)
    }

    pub fn size_of_fracture(&self, fracture_idx: usize) -> Result<usize> {
        Ok(self.active().get(fracture_idx)?.len())
    }

    /// All playables still in the queue, in original order
    pub fn playables(&self) -> Vec<Arc<dyn Playable>> {
        self.sequential
            .coords()
            .filter_map(|offset| self.playables.get(offset).cloned())
            .collect()
    }

    /// All playables still in the queue, in the active (possibly shuffled) order
    pub fn playables_in_current_order(&self) -> Result<Vec<Arc<dyn Playable>>> {
        self.active()
            .coords()
            .map(|coord| self.playable_at(coord))
            .collect()
    }

    pub fn playables_in_fracture(&self, fracture_idx: usize) -> Result<Vec<Arc<dyn Playable>>> {
        self.playables_in(self.active().get(fracture_idx)?)
    }

    /// At most `limit` playables of the fracture that follow the current item
    pub fn next_playables_in_fracture(
        &self,
        fracture_idx: usize,
        limit: usize,
    ) -> Result<Vec<Arc<dyn Playable>>> {
        let range = self.active().get(fracture_idx)?;
        let start = match self.current {
            Some(current) if range.contains(&current) => current + 1,
            _ => range.start,
        };
        let end = range.end.min(start.saturating_add(limit));
        self.playables_in(start..end)
    }

    /// At most `limit` playables of the fracture that precede the current item
    pub fn previous_playables_in_fracture(
        &self,
        fracture_idx: usize,
        limit: usize,
    ) -> Result<Vec<Arc<dyn Playable>>> {
        let range = self.active().get(fracture_idx)?;
        let end = match self.current {
            Some(current) if range.contains(&current) => current,
            _ => range.end,
        };
        let start = end.saturating_sub(limit).max(range.start);
        self.playables_in(start..end)
    }

    /// Current index in the active view, `None` if not playing
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_index_within_fracture(&self, fracture_idx: usize) -> Result<Option<usize>> {
        let range = self.active().get(fracture_idx)?;
        Ok(self
            .current
            .filter(|current| range.contains(current))
            .map(|current| current - range.start))
    }

    pub fn current(&self) -> Result<Arc<dyn Playable>> {
        let current = self
            .current
            .ok_or_else(|| QueueError::invalid_state("fragment is not playing"))?;
        self.playable_at(current)
    }

    pub fn has_next(&self, fracture_idx: usize) -> Result<bool> {
        let range = self.active().get(fracture_idx)?;
        Ok(match self.current {
            Some(current) if range.contains(&current) => current + 1 < range.end,
            Some(current) => current < range.start,
            None => true,
        })
    }

    pub fn has_previous(&self, fracture_idx: usize) -> Result<bool> {
        let range = self.active().get(fracture_idx)?;
        Ok(match self.current {
            Some(current) if range.contains(&current) => current > range.start,
            Some(current) => current >= range.end,
            None => false,
        })
    }

    fn following(&self) -> Option<usize> {
        match self.current {
            Some(current) => self.active().successor(current),
            None => self.active().first(),
        }
    }

    pub fn next(&mut self) -> Result<Arc<dyn Playable>> {
        let next = self.following().ok_or(QueueError::NoNextElement)?;
        self.current = Some(next);
        self.playable_at(next)
    }

    pub fn previous(&mut self) -> Result<Arc<dyn Playable>> {
        let previous = self
            .current
            .and_then(|current| self.active().predecessor(current))
            .ok_or(QueueError::NoPreviousElement)?;
        self.current = Some(previous);
        self.playable_at(previous)
    }

    pub fn peek_next(&self) -> Option<Arc<dyn Playable>> {
        self.following().and_then(|next| self.playable_at(next).ok())
    }

    /// Move the current item to `offset` within the given fracture
    pub fn set_position(&mut self, fracture_idx: usize, offset: usize) -> Result<()> {
        let range = self.active().get(fracture_idx)?;
        if offset >= range.len() {
            return Err(QueueError::IndexOutOfBounds {
                index: offset,
                size: range.len(),
            });
        }
        self.current = Some(range.start + offset);
        Ok(())
    }

    pub fn reset_position_to_start(&mut self) {
        self.current = self.active().first();
    }

    pub fn reset_position_to_end(&mut self) {
        self.current = self.active().last();
    }

    pub fn clear_position(&mut self) {
        self.current = None;
    }

    /// Shuffle this fragment's order and split it at random offsets
    ///
    /// With `protect_current` the current item becomes position 0. Returns the
    /// number of random fractures created.
    pub fn enable_shuffle(&mut self, protect_current: bool) -> usize {
        if self.shuffle.is_some() {
            self.disable_shuffle();
        }

        let mut rng = rand::thread_rng();
        let live: Vec<usize> = self.sequential.coords().collect();
        let (permutation, current) = permute(&live, self.current, protect_current, &mut rng);

        let offsets = fracture_offsets(permutation.len(), &mut rng);
        let partition = Partition::split_at(permutation.len(), &offsets);

        self.shuffle = Some(ShuffleState {
            permutation,
            partition,
        });
        self.current = current;
        offsets.len()
    }

    /// Enter the shuffled view without reordering or fracturing
    ///
    /// Used when a fragment is inserted at an explicit position while the
    /// queue is shuffled.
    pub(crate) fn enable_ordered_shuffle(&mut self) {
        if self.shuffle.is_some() {
            self.disable_shuffle();
        }

        let permutation: Vec<usize> = self.sequential.coords().collect();
        let current = self
            .current
            .and_then(|offset| permutation.iter().position(|&o| o == offset));
        self.shuffle = Some(ShuffleState {
            partition: Partition::whole(permutation.len()),
            permutation,
        });
        self.current = current;
    }

    /// Map the current item back to its original offset and drop the permutation
    pub fn disable_shuffle(&mut self) {
        if let Some(state) = self.shuffle.take() {
            self.current = self
                .current
                .and_then(|position| state.permutation.get(position).copied());
        }
    }

    /// Single-item fragment wrapping exactly the current item
    pub fn reduce_to_current_playable(&self) -> Result<SingleFragment> {
        Ok(SingleFragment::new(self.current()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{Source, Track, TrackMetadata};
    use std::time::Duration;

    fn fragment(size: usize) -> MultiFragment {
        let playables = (0..size)
            .map(|i| {
                Track::resolved(
                    format!("p{}", i),
                    Source::Local,
                    TrackMetadata::new(format!("Track {}", i), None, Duration::from_secs(180)),
                )
                .into_playable()
            })
            .collect();
        MultiFragment::new(ContainerKind::Album, playables)
    }

    fn ids(playables: &[Arc<dyn Playable>]) -> Vec<String> {
        playables.iter().map(|p| p.id().to_string()).collect()
    }

    #[test]
    fn fractures_split_without_copying() {
        let mut frag = fragment(10);
        assert_eq!(frag.add_fracture(7).unwrap(), 1);

        assert_eq!(frag.ordered_fractures(), vec![0..7, 7..10]);
        assert_eq!(frag.size_of_fracture(1).unwrap(), 3);
        assert_eq!(ids(&frag.playables_in_fracture(1).unwrap()), vec!["p7", "p8", "p9"]);
        assert_eq!(frag.size(), 10);
    }

    #[test]
    fn fracture_at_bounds_is_invalid() {
        let mut frag = fragment(4);
        assert!(matches!(
            frag.add_fracture(0),
            Err(QueueError::InvalidFracture { .. })
        ));
        assert!(frag.add_fracture(4).is_err());
    }

    #[test]
    fn navigation_is_fracture_scoped() {
        let mut frag = fragment(5);
        frag.add_fracture(2).unwrap();

        frag.set_position(0, 1).unwrap();
        assert!(!frag.has_next(0).unwrap());
        assert!(frag.has_next(1).unwrap());
        assert!(frag.has_previous(0).unwrap());
        assert!(!frag.has_previous(1).unwrap());

        // global navigation crosses the fracture
        assert_eq!(frag.next().unwrap().id(), "p2");
        assert_eq!(frag.current_index_within_fracture(1).unwrap(), Some(0));
        assert_eq!(frag.current_index_within_fracture(0).unwrap(), None);
        assert_eq!(frag.previous().unwrap().id(), "p1");
    }

    #[test]
    fn next_and_previous_fail_at_bounds() {
        let mut frag = fragment(2);
        assert!(matches!(frag.previous(), Err(QueueError::NoPreviousElement)));
        assert_eq!(frag.next().unwrap().id(), "p0");
        assert_eq!(frag.peek_next().unwrap().id(), "p1");
        frag.next().unwrap();
        assert!(frag.peek_next().is_none());
        assert!(matches!(frag.next(), Err(QueueError::NoNextElement)));
    }

    #[test]
    fn lookaround_respects_current_item() {
        let mut frag = fragment(6);
        frag.set_position(0, 2).unwrap();

        assert_eq!(ids(&frag.next_playables_in_fracture(0, 2).unwrap()), vec!["p3", "p4"]);
        assert_eq!(ids(&frag.previous_playables_in_fracture(0, 5).unwrap()), vec!["p0", "p1"]);
        assert_eq!(ids(&frag.previous_playables_in_fracture(0, 1).unwrap()), vec!["p1"]);
    }

    #[test]
    fn shuffle_protects_current_and_round_trips() {
        let mut frag = fragment(8);
        frag.set_position(0, 5).unwrap();

        let fractures = frag.enable_shuffle(true);
        assert!(frag.is_shuffled());
        assert_eq!(frag.current_index(), Some(0));
        assert_eq!(frag.current().unwrap().id(), "p5");
        assert_eq!(frag.ordered_fractures().len(), fractures + 1);

        let mut shuffled = ids(&frag.playables_in_current_order().unwrap());
        shuffled.sort();
        let mut original = ids(&frag.playables());
        original.sort();
        assert_eq!(shuffled, original);

        frag.disable_shuffle();
        assert!(!frag.is_shuffled());
        assert_eq!(frag.current_index(), Some(5));
        assert_eq!(frag.ordered_fractures(), vec![0..8]);
    }

    #[test]
    fn ordered_shuffle_keeps_order() {
        let mut frag = fragment(3);
        frag.enable_ordered_shuffle();

        assert!(frag.is_shuffled());
        assert_eq!(ids(&frag.playables_in_current_order().unwrap()), vec!["p0", "p1", "p2"]);
        assert_eq!(frag.ordered_fractures(), vec![0..3]);
    }

    #[test]
    fn reduce_requires_current_item() {
        let mut frag = fragment(3);
        assert!(frag.reduce_to_current_playable().is_err());

        frag.set_position(0, 2).unwrap();
        frag.enable_shuffle(true);
        let single = frag.reduce_to_current_playable().unwrap();
        assert_eq!(single.current().id(), "p2");
    }
}
