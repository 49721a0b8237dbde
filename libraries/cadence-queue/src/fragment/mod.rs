//! Fragments: the unit of content placed in the queue
//!
//! A fragment wraps the playables of one resolved container. Multi-item
//! fragments can be fractured into contiguous pieces so the shuffled queue
//! can interleave them with other content, while the sequential queue keeps
//! the original order.
//!
//! Fragments live in a [`FragmentStore`] and are shared by both node lists
//! through [`FragmentId`] handles. Each stored fragment counts the nodes
//! that reference it and is dropped when the last one is unlinked.

mod multi;
mod partition;
mod single;

pub use multi::MultiFragment;
pub use single::SingleFragment;

use crate::arena::{arena_key, Arena};
use crate::error::{QueueError, Result};
use crate::types::View;
use cadence_core::{Container, ContainerKind, Playable, PlayableFactory};
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

arena_key!(
    /// Handle to a fragment in a [`FragmentStore`]
    FragmentId
);

/// Queue content from one container
#[derive(Debug, Clone)]
pub enum Fragment {
    Single(SingleFragment),
    Multi(MultiFragment),
}

impl Fragment {
    pub fn single(playable: Arc<dyn Playable>) -> Self {
        Fragment::Single(SingleFragment::new(playable))
    }

    /// Fragment over several playables
    ///
    /// # Errors
    ///
    /// [`QueueError::NoResults`] if `playables` is empty.
    pub fn multi(kind: ContainerKind, playables: Vec<Arc<dyn Playable>>) -> Result<Self> {
        if playables.is_empty() {
            return Err(QueueError::NoResults);
        }
        Ok(Fragment::Multi(MultiFragment::new(kind, playables)))
    }

    /// Resolve a container into a fragment
    ///
    /// Returns `None` when the container resolves to nothing. Single
    /// containers and one-item listings become [`SingleFragment`]s.
    pub fn from_container(
        container: &Container,
        factory: &dyn PlayableFactory,
    ) -> Result<Option<Self>> {
        let mut playables = container.resolve(factory)?;
        debug!(
            "Resolved {} into {} playables",
            container.describe(),
            playables.len()
        );

        Ok(match playables.len() {
            0 => None,
            1 => playables.pop().map(Fragment::single),
            _ => Some(Fragment::Multi(MultiFragment::new(
                container.kind(),
                playables,
            ))),
        })
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            Fragment::Single(_) => ContainerKind::Single,
            Fragment::Multi(multi) => multi.kind(),
        }
    }

    /// Number of playables still in the queue
    pub fn size(&self) -> usize {
        match self {
            Fragment::Single(single) => single.size(),
            Fragment::Multi(multi) => multi.size(),
        }
    }

    pub fn is_shuffled(&self) -> bool {
        match self {
            Fragment::Single(_) => false,
            Fragment::Multi(multi) => multi.is_shuffled(),
        }
    }

    /// # Errors
    ///
    /// [`QueueError::CannotFracture`] for single fragments,
    /// [`QueueError::InvalidFracture`] if `offset` is not strictly inside a fracture.
    pub fn add_fracture(&mut self, offset: usize) -> Result<usize> {
        match self {
            Fragment::Single(single) => single.add_fracture(offset),
            Fragment::Multi(multi) => multi.add_fracture(offset),
        }
    }

    pub fn ordered_fractures(&self) -> Vec<Range<usize>> {
        match self {
            Fragment::Single(single) => single.ordered_fractures(),
            Fragment::Multi(multi) => multi.ordered_fractures(),
        }
    }

    pub fn size_of_fracture(&self, fracture_idx: usize) -> Result<usize> {
        match self {
            Fragment::Single(single) => single.size_of_fracture(fracture_idx),
            Fragment::Multi(multi) => multi.size_of_fracture(fracture_idx),
        }
    }

    pub fn playables(&self) -> Vec<Arc<dyn Playable>> {
        match self {
            Fragment::Single(single) => vec![single.playable()],
            Fragment::Multi(multi) => multi.playables(),
        }
    }

    pub fn playables_in_current_order(&self) -> Result<Vec<Arc<dyn Playable>>> {
        match self {
            Fragment::Single(single) => Ok(vec![single.playable()]),
            Fragment::Multi(multi) => multi.playables_in_current_order(),
        }
    }

    pub fn playables_in_fracture(&self, fracture_idx: usize) -> Result<Vec<Arc<dyn Playable>>> {
        match self {
            Fragment::Single(single) => single.playables_in_fracture(fracture_idx),
            Fragment::Multi(multi) => multi.playables_in_fracture(fracture_idx),
        }
    }

    pub fn next_playables_in_fracture(
        &self,
        fracture_idx: usize,
        limit: usize,
    ) -> Result<Vec<Arc<dyn Playable>>> {
        match self {
            Fragment::Single(single) => single.next_playables_in_fracture(fracture_idx, limit),
            Fragment::Multi(multi) => multi.next_playables_in_fracture(fracture_idx, limit),
        }
    }

    pub fn previous_playables_in_fracture(
        &self,
        fracture_idx: usize,
        limit: usize,
    ) -> Result<Vec<Arc<dyn Playable>>> {
        match self {
            Fragment::Single(single) => single.previous_playables_in_fracture(fracture_idx, limit),
            Fragment::Multi(multi) => multi.previous_playables_in_fracture(fracture_idx, limit),
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self {
            Fragment::Single(single) => single.current_index(),
            Fragment::Multi(multi) => multi.current_index(),
        }
    }

    pub fn current_index_within_fracture(&self, fracture_idx: usize) -> Result<Option<usize>> {
        match self {
            Fragment::Single(single) => single.current_index_within_fracture(fracture_idx),
            Fragment::Multi(multi) => multi.current_index_within_fracture(fracture_idx),
        }
    }

    pub fn current(&self) -> Result<Arc<dyn Playable>> {
        match self {
            Fragment::Single(single) => Ok(single.current()),
            Fragment::Multi(multi) => multi.current(),
        }
    }

    pub fn has_next(&self, fracture_idx: usize) -> Result<bool> {
        match self {
            Fragment::Single(single) => single.has_next(fracture_idx),
            Fragment::Multi(multi) => multi.has_next(fracture_idx),
        }
    }

    pub fn has_previous(&self, fracture_idx: usize) -> Result<bool> {
        match self {
            Fragment::Single(single) => single.has_previous(fracture_idx),
            Fragment::Multi(multi) => multi.has_previous(fracture_idx),
        }
    }

    pub fn next(&mut self) -> Result<Arc<dyn Playable>> {
        match self {
            Fragment::Single(single) => single.next(),
            Fragment::Multi(multi) => multi.next(),
        }
    }

    pub fn previous(&mut self) -> Result<Arc<dyn Playable>> {
        match self {
            Fragment::Single(single) => single.previous(),
            Fragment::Multi(multi) => multi.previous(),
        }
    }

    pub fn peek_next(&self) -> Option<Arc<dyn Playable>> {
        match self {
            Fragment::Single(single) => single.peek_next(),
            Fragment::Multi(multi) => multi.peek_next(),
        }
    }

    pub fn set_position(&mut self, fracture_idx: usize, offset: usize) -> Result<()> {
        match self {
            Fragment::Single(single) => single.set_position(fracture_idx, offset),
            Fragment::Multi(multi) => multi.set_position(fracture_idx, offset),
        }
    }

    pub fn reset_position_to_start(&mut self) {
        match self {
            Fragment::Single(single) => single.reset_position_to_start(),
            Fragment::Multi(multi) => multi.reset_position_to_start(),
        }
    }

    pub fn reset_position_to_end(&mut self) {
        match self {
            Fragment::Single(single) => single.reset_position_to_end(),
            Fragment::Multi(multi) => multi.reset_position_to_end(),
        }
    }

    pub fn clear_position(&mut self) {
        match self {
            Fragment::Single(single) => single.clear_position(),
            Fragment::Multi(multi) => multi.clear_position(),
        }
    }

    /// Shuffle and randomly fracture; returns the number of fractures created
    pub fn enable_shuffle(&mut self, protect_current: bool) -> usize {
        match self {
            Fragment::Single(_) => 0,
            Fragment::Multi(multi) => multi.enable_shuffle(protect_current),
        }
    }

    pub(crate) fn enable_ordered_shuffle(&mut self) {
        if let Fragment::Multi(multi) = self {
            multi.enable_ordered_shuffle();
        }
    }

    pub fn disable_shuffle(&mut self) {
        if let Fragment::Multi(multi) = self {
            multi.disable_shuffle();
        }
    }

    /// Single-item fragment holding only the current playable
    pub fn reduce_to_current_playable(&self) -> Result<Fragment> {
        match self {
            Fragment::Single(single) => Ok(Fragment::single(single.current())),
            Fragment::Multi(multi) => multi.reduce_to_current_playable().map(Fragment::Single),
        }
    }

    // Operations in an explicit coordinate space, used by the node lists.
    // The sequential list keeps working in original offsets while the
    // fragment's active view is shuffled.

    pub(crate) fn fractures_in(&self, view: View) -> Result<Vec<Range<usize>>> {
        match self {
            Fragment::Single(_) => Ok(vec![0..1]),
            Fragment::Multi(multi) => Ok(multi.partition(view)?.ordered().collect()),
        }
    }

    pub(crate) fn fracture_index_of(&self, view: View, start: usize) -> Result<usize> {
        let index = match self {
            Fragment::Single(_) => (start == 0).then_some(0),
            Fragment::Multi(multi) => multi.partition(view)?.index_of(start),
        };
        index.ok_or_else(|| {
            QueueError::invalid_state(format!("no fracture starts at offset {}", start))
        })
    }

    pub(crate) fn fracture_containing(&self, view: View, coord: usize) -> Result<Option<Range<usize>>> {
        match self {
            Fragment::Single(_) => Ok((coord == 0).then_some(0..1)),
            Fragment::Multi(multi) => Ok(multi.partition(view)?.containing(coord)),
        }
    }

    /// Split so that a fracture starts at `at`
    pub(crate) fn split(&mut self, view: View, at: usize) -> Result<()> {
        match self {
            Fragment::Single(_) => Err(QueueError::CannotFracture),
            Fragment::Multi(multi) => multi.partition_mut(view)?.split(at).map(|_| ()),
        }
    }

    /// Remove the fracture starting at `start` from `view`
    pub(crate) fn drop_fracture(&mut self, view: View, start: usize) -> Result<Range<usize>> {
        match self {
            Fragment::Single(_) => Ok(0..1),
            Fragment::Multi(multi) => {
                let end = multi.partition_mut(view)?.remove(start).ok_or_else(|| {
                    QueueError::invalid_state(format!("no fracture starts at offset {}", start))
                })?;
                Ok(start..end)
            }
        }
    }

    pub(crate) fn playable_in_view(&self, view: View, coord: usize) -> Result<Arc<dyn Playable>> {
        match self {
            Fragment::Single(single) => Ok(single.playable()),
            Fragment::Multi(multi) => multi.playable_in_view(view, coord),
        }
    }

    /// Map a coordinate of `view` to the original item offset
    pub(crate) fn original_offset(&self, view: View, coord: usize) -> Result<usize> {
        match self {
            Fragment::Single(_) => Ok(coord),
            Fragment::Multi(multi) => multi.original_offset(view, coord),
        }
    }
}

impl From<SingleFragment> for Fragment {
    fn from(single: SingleFragment) -> Self {
        Fragment::Single(single)
    }
}

#[derive(Debug)]
struct Entry {
    fragment: Fragment,
    refs: usize,
}

/// Fragments shared by the sequential and shuffled node lists
#[derive(Debug, Default)]
pub struct FragmentStore {
    arena: Arena<FragmentId, Entry>,
}

impl FragmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fragment with no references yet
    pub fn insert(&mut self, fragment: Fragment) -> FragmentId {
        self.arena.insert(Entry { fragment, refs: 0 })
    }

    pub fn get(&self, id: FragmentId) -> Result<&Fragment> {
        self.arena
            .get(id)
            .map(|entry| &entry.fragment)
            .ok_or_else(|| QueueError::invalid_state(format!("dangling fragment {:?}", id)))
    }

    pub fn get_mut(&mut self, id: FragmentId) -> Result<&mut Fragment> {
        self.arena
            .get_mut(id)
            .map(|entry| &mut entry.fragment)
            .ok_or_else(|| QueueError::invalid_state(format!("dangling fragment {:?}", id)))
    }

    /// Record one more node referencing `id`
    pub(crate) fn retain(&mut self, id: FragmentId) -> Result<()> {
        let entry = self
            .arena
            .get_mut(id)
            .ok_or_else(|| QueueError::invalid_state(format!("dangling fragment {:?}", id)))?;
        entry.refs += 1;
        Ok(())
    }

    /// Drop one node reference, removing the fragment when none remain
    pub(crate) fn release(&mut self, id: FragmentId) -> Result<()> {
        let entry = self
            .arena
            .get_mut(id)
            .ok_or_else(|| QueueError::invalid_state(format!("dangling fragment {:?}", id)))?;
        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs == 0 {
            self.arena.remove(id);
            debug!("Dropped fragment {:?}", id);
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn ref_count(&self, id: FragmentId) -> usize {
        self.arena.get(id).map_or(0, |entry| entry.refs)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (FragmentId, &mut Fragment)> {
        self.arena
            .iter_mut()
            .map(|(id, entry)| (id, &mut entry.fragment))
    }

    pub fn clear_positions(&mut self) {
        for (_, fragment) in self.iter_mut() {
            fragment.clear_position();
        }
    }

    pub fn clear(&mut self) {
        self.arena = Arena::new();
    }
}
