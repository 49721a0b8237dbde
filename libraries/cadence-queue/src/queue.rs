//! Playback queue
//!
//! [`Queue`] is the thread-safe facade. All state lives in [`QueueState`]
//! behind one `parking_lot::RwLock`; the read and write guards returned by
//! [`Queue::read`] and [`Queue::write`] are the proof that the lock is held,
//! so composite operations (clear then insert, resolve then add) run as one
//! transaction without re-entering the lock.
//!
//! The queue keeps two node lists over the same fragments: the sequential
//! list in insertion order and the shuffled list, which is only populated
//! while shuffle is on. Positions (`curr_idx`, indices passed to `insert`,
//! `remove`, ...) always refer to the active list.

use crate::config::QueueConfig;
use crate::error::{QueueError, Result};
use crate::fragment::{Fragment, FragmentId, FragmentStore};
use crate::node_list::{NodeList, Piece};
use crate::shuffle::riffle;
use crate::types::{RepeatMode, View};
use cadence_core::{Container, Playable, PlayableFactory};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Thread-safe playback queue
#[derive(Debug, Default)]
pub struct Queue {
    state: RwLock<QueueState>,
}

/// Queue state, reachable only through a lock guard
#[derive(Debug)]
pub struct QueueState {
    fragments: FragmentStore,
    sequential: NodeList,
    shuffled: NodeList,
    is_shuffle: bool,
    repeat: RepeatMode,
    curr_idx: Option<usize>,
    max_size: Option<usize>,
}

impl Default for QueueState {
    fn default() -> Self {
        Self {
            fragments: FragmentStore::new(),
            sequential: NodeList::new(View::Sequential),
            shuffled: NodeList::new(View::Shuffled),
            is_shuffle: false,
            repeat: RepeatMode::Off,
            curr_idx: None,
            max_size: None,
        }
    }
}

impl Queue {
    /// Create an unbounded queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a queue holding at most `max_size` playables
    ///
    /// # Errors
    ///
    /// [`QueueError::Config`] if `max_size` is `Some(0)`.
    pub fn with_max_size(max_size: Option<usize>) -> Result<Self> {
        Ok(Self {
            state: RwLock::new(QueueState::new(max_size)?),
        })
    }

    pub fn from_config(config: &QueueConfig) -> Result<Self> {
        config.validate()?;
        Self::with_max_size(config.max_size)
    }

    /// Acquire the read lock
    pub fn read(&self) -> RwLockReadGuard<'_, QueueState> {
        self.state.read()
    }

    /// Acquire the write lock
    pub fn write(&self) -> RwLockWriteGuard<'_, QueueState> {
        self.state.write()
    }

    pub fn get_tracks(&self) -> Result<Vec<Arc<dyn Playable>>> {
        self.read().tracks()
    }

    pub fn get_playable_at_index(&self, idx: usize) -> Result<Arc<dyn Playable>> {
        self.read().playable_at(idx)
    }

    pub fn position(&self) -> Option<usize> {
        self.read().position()
    }

    pub fn set_position(&self, idx: usize) -> Result<()> {
        self.write().set_position(idx)
    }

    pub fn get_current(&self) -> Result<Arc<dyn Playable>> {
        self.read().current()
    }

    pub fn iterate(&self) -> Result<Arc<dyn Playable>> {
        self.write().iterate()
    }

    pub fn reverse(&self) -> Result<Arc<dyn Playable>> {
        self.write().reverse()
    }

    pub fn peek_next(&self) -> Result<Option<Arc<dyn Playable>>> {
        self.read().peek_next()
    }

    pub fn has_next(&self, ignore_repeat: bool) -> bool {
        self.read().has_next(ignore_repeat)
    }

    pub fn has_previous(&self, ignore_repeat: bool) -> bool {
        self.read().has_previous(ignore_repeat)
    }

    pub fn size(&self) -> usize {
        self.read().size()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn max_size(&self) -> Option<usize> {
        self.read().max_size()
    }

    pub fn clear(&self, retain_current: bool) -> Result<()> {
        self.write().clear(retain_current)
    }

    pub fn add(&self, fragment: Fragment) -> Result<usize> {
        self.write().add(fragment)
    }

    pub fn insert(&self, idx: usize, fragment: Fragment) -> Result<usize> {
        self.write().insert(idx, fragment)
    }

    pub fn insert_next(&self, fragment: Fragment) -> Result<usize> {
        self.write().insert_next(fragment)
    }

    pub fn insert_relative(&self, relative_idx: usize, fragment: Fragment) -> Result<usize> {
        self.write().insert_relative(relative_idx, fragment)
    }

    pub fn set(&self, fragment: Fragment) -> Result<usize> {
        self.write().set(fragment)
    }

    /// Resolve `containers` and add the resulting fragments
    ///
    /// Resolution runs before the write lock is taken. Containers that
    /// resolve to nothing are skipped. With `insertion_idx` the fragments
    /// are inserted in order starting that many items after the current
    /// one; otherwise they are appended. Returns the number of playables
    /// added.
    ///
    /// # Errors
    ///
    /// [`QueueError::NoResults`] if no container produced a fragment.
    pub fn add_containers(
        &self,
        containers: &[Container],
        factory: &dyn PlayableFactory,
        clear: bool,
        insertion_idx: Option<usize>,
    ) -> Result<usize> {
        let mut fragments = Vec::with_capacity(containers.len());
        for container in containers {
            if let Some(fragment) = Fragment::from_container(container, factory)? {
                fragments.push(fragment);
            }
        }

        self.write().add_fragments(fragments, clear, insertion_idx)
    }

    pub fn remove(&self, from: usize, to: usize) -> Result<usize> {
        self.write().remove(from, to)
    }

    pub fn remove_relative(&self, from: usize, to: usize) -> Result<usize> {
        self.write().remove_relative(from, to)
    }

    pub fn randomize(&self) -> Result<()> {
        self.write().randomize()
    }

    pub fn is_shuffle(&self) -> bool {
        self.read().is_shuffle()
    }

    pub fn set_shuffle(&self, shuffle: bool) -> Result<()> {
        self.write().set_shuffle(shuffle)
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.read().repeat_mode()
    }

    pub fn set_repeat_mode(&self, mode: RepeatMode) {
        self.write().set_repeat_mode(mode);
    }

    pub fn list_next(&self, limit: usize) -> Result<Vec<Arc<dyn Playable>>> {
        self.read().list_next(limit)
    }

    pub fn list_prev(&self, limit: usize) -> Result<Vec<Arc<dyn Playable>>> {
        self.read().list_prev(limit)
    }

    pub fn reset(&self) -> Result<()> {
        self.write().reset()
    }
}

impl QueueState {
    /// Empty state holding at most `max_size` playables
    pub fn new(max_size: Option<usize>) -> Result<Self> {
        if max_size == Some(0) {
            return Err(QueueError::Config(
                "max_size must be at least 1 (use None for an unbounded queue)".to_string(),
            ));
        }
        Ok(Self {
            max_size,
            ..Self::default()
        })
    }

    fn active(&self) -> &NodeList {
        if self.is_shuffle {
            &self.shuffled
        } else {
            &self.sequential
        }
    }

    fn active_mut(&mut self) -> (&mut NodeList, &mut FragmentStore) {
        if self.is_shuffle {
            (&mut self.shuffled, &mut self.fragments)
        } else {
            (&mut self.sequential, &mut self.fragments)
        }
    }

    // ===== Reads =====

    /// Number of playables in the queue
    pub fn size(&self) -> usize {
        self.active().size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Index of the current item, `None` if empty or never started
    pub fn position(&self) -> Option<usize> {
        self.curr_idx
    }

    pub fn max_size(&self) -> Option<usize> {
        self.max_size
    }

    pub fn repeat_mode(&self) -> RepeatMode {
        self.repeat
    }

    pub fn set_repeat_mode(&mut self, mode: RepeatMode) {
        debug!("Repeat mode: {:?}", mode);
        self.repeat = mode;
    }

    pub fn is_shuffle(&self) -> bool {
        self.is_shuffle
    }

    /// All playables in active order
    pub fn tracks(&self) -> Result<Vec<Arc<dyn Playable>>> {
        self.active().playables(&self.fragments)
    }

    pub fn playable_at(&self, idx: usize) -> Result<Arc<dyn Playable>> {
        self.active().playable_at(idx, &self.fragments)
    }

    /// Current playable
    ///
    /// # Errors
    ///
    /// [`QueueError::InvalidState`] if the queue is empty or was never started.
    pub fn current(&self) -> Result<Arc<dyn Playable>> {
        self.active()
            .current(&self.fragments)?
            .ok_or_else(|| QueueError::invalid_state("no current element"))
    }

    /// Next playable without moving the cursor
    pub fn peek_next(&self) -> Result<Option<Arc<dyn Playable>>> {
        let size = self.size();
        if size == 0 {
            return Ok(None);
        }

        let next = match (self.curr_idx, self.repeat) {
            (Some(_), RepeatMode::One) => return self.current().map(Some),
            (None, _) => 0,
            (Some(curr), _) if curr + 1 < size => curr + 1,
            (Some(_), RepeatMode::All) => 0,
            (Some(_), _) => return Ok(None),
        };
        self.playable_at(next).map(Some)
    }

    pub fn has_next(&self, ignore_repeat: bool) -> bool {
        let size = self.size();
        if size == 0 {
            return false;
        }

        let in_bound = !self.curr_idx.is_some_and(|curr| curr + 1 >= size);
        in_bound || (!ignore_repeat && self.repeat.is_repeating())
    }

    pub fn has_previous(&self, ignore_repeat: bool) -> bool {
        if self.is_empty() {
            return false;
        }

        let in_bound = self.curr_idx.is_some_and(|curr| curr > 0);
        in_bound || (!ignore_repeat && self.repeat.is_repeating())
    }

    /// Up to `limit` playables after the current one
    ///
    /// Wraps to the start only with [`RepeatMode::All`].
    pub fn list_next(&self, limit: usize) -> Result<Vec<Arc<dyn Playable>>> {
        let mut playables = Vec::with_capacity(limit);
        if limit == 0 || self.is_empty() {
            return Ok(playables);
        }

        let list = self.active();
        let store = &self.fragments;
        let mut node = match list.cursor() {
            Some(cursor) => {
                let fracture_idx = list.fracture_index_of(cursor.node, store)?;
                let current = list.node(cursor.node)?;
                playables.extend(
                    store
                        .get(current.fragment)?
                        .next_playables_in_fracture(fracture_idx, limit)?,
                );
                current.next
            }
            None => list.head(),
        };

        loop {
            while playables.len() < limit {
                let Some(id) = node else { break };
                let remaining = limit - playables.len();
                playables.extend(list.playables_of(id, store)?.into_iter().take(remaining));
                node = list.node(id)?.next;
            }

            if playables.len() >= limit || self.repeat != RepeatMode::All {
                break;
            }
            node = list.head();
        }

        Ok(playables)
    }

    /// Up to `limit` playables before the current one, oldest first
    pub fn list_prev(&self, limit: usize) -> Result<Vec<Arc<dyn Playable>>> {
        let list = self.active();
        let store = &self.fragments;
        let Some(cursor) = list.cursor() else {
            return Ok(Vec::new());
        };

        let fracture_idx = list.fracture_index_of(cursor.node, store)?;
        let current = list.node(cursor.node)?;
        let mut chunks = vec![store
            .get(current.fragment)?
            .previous_playables_in_fracture(fracture_idx, limit)?];
        let mut count = chunks[0].len();

        let mut node = current.prev;
        while count < limit {
            let Some(id) = node else { break };
            let mut playables = list.playables_of(id, store)?;
            let skip = playables.len().saturating_sub(limit - count);
            playables.drain(..skip);
            count += playables.len();
            chunks.push(playables);
            node = list.node(id)?.prev;
        }

        Ok(chunks.into_iter().rev().flatten().collect())
    }

    // ===== Cursor =====

    /// Re-derive every cursor from `curr_idx`
    fn sync_cursor(&mut self) -> Result<()> {
        self.fragments.clear_positions();
        let (active, inactive) = if self.is_shuffle {
            (&mut self.shuffled, &mut self.sequential)
        } else {
            (&mut self.sequential, &mut self.shuffled)
        };
        inactive.clear_cursor();

        match self.curr_idx {
            Some(idx) => active.seek(idx, &mut self.fragments),
            None => {
                active.clear_cursor();
                Ok(())
            }
        }
    }

    pub fn set_position(&mut self, idx: usize) -> Result<()> {
        let size = self.size();
        if idx >= size {
            return Err(QueueError::IndexOutOfBounds { index: idx, size });
        }
        self.curr_idx = Some(idx);
        self.sync_cursor()
    }

    /// Advance to the next item, wrapping with [`RepeatMode::All`]
    pub fn iterate(&mut self) -> Result<Arc<dyn Playable>> {
        let size = self.size();
        let curr_idx = self.curr_idx;
        match curr_idx {
            _ if size == 0 => return Err(QueueError::NoNextElement),
            Some(curr) if curr + 1 < size => {
                let (list, store) = self.active_mut();
                list.advance(store)?;
                self.curr_idx = Some(curr + 1);
            }
            None => {
                self.curr_idx = Some(0);
                self.sync_cursor()?;
            }
            Some(_) if self.repeat == RepeatMode::All => {
                self.curr_idx = Some(0);
                self.sync_cursor()?;
            }
            Some(_) => return Err(QueueError::NoNextElement),
        }
        self.current()
    }

    /// Step back to the previous item, wrapping with [`RepeatMode::All`]
    pub fn reverse(&mut self) -> Result<Arc<dyn Playable>> {
        let size = self.size();
        let curr_idx = self.curr_idx;
        match curr_idx {
            Some(curr) if curr > 0 => {
                let (list, store) = self.active_mut();
                list.retreat(store)?;
                self.curr_idx = Some(curr - 1);
            }
            Some(_) if size > 0 && self.repeat == RepeatMode::All => {
                self.curr_idx = Some(size - 1);
                self.sync_cursor()?;
            }
            _ => return Err(QueueError::NoPreviousElement),
        }
        self.current()
    }

    /// Restart after playback reached the end
    pub fn reset(&mut self) -> Result<()> {
        let size = self.size();
        self.curr_idx = match self.curr_idx {
            _ if size == 0 => None,
            Some(curr) if curr + 1 < size => Some(curr + 1),
            _ => Some(0),
        };
        self.sync_cursor()
    }

    // ===== Insertion =====

    /// Reject growing a queue of `current` playables by `additional`
    fn ensure_capacity(&self, current: usize, additional: usize) -> Result<()> {
        if let Some(max_size) = self.max_size {
            if current + additional > max_size {
                warn!(
                    "Rejected {} tracks: queue of {} would exceed {}",
                    additional, current, max_size
                );
                return Err(QueueError::CapacityExceeded { max_size });
            }
        }
        Ok(())
    }

    /// Insert `fragment` at `idx`; returns the number of playables added
    ///
    /// The first insertion into an empty queue makes index 0 current.
    ///
    /// # Errors
    ///
    /// [`QueueError::IndexOutOfBounds`] if `idx > size`,
    /// [`QueueError::CapacityExceeded`] if the queue would grow past its
    /// maximum size. The queue is unchanged on error.
    pub fn insert(&mut self, idx: usize, fragment: Fragment) -> Result<usize> {
        let size = self.size();
        if idx > size {
            return Err(QueueError::IndexOutOfBounds { index: idx, size });
        }
        let count = fragment.size();
        self.ensure_capacity(size, count)?;

        let id = self.fragments.insert(fragment);
        if self.is_shuffle {
            self.insert_shuffled(idx, id)?;
        } else {
            self.sequential.insert(idx, id, &mut self.fragments)?;
        }
        debug!("Inserted {} tracks at {} (queue size {})", count, idx, self.size());

        self.curr_idx = match self.curr_idx {
            _ if size == 0 => Some(0),
            Some(curr) if idx <= curr => Some(curr + count),
            curr => curr,
        };
        self.sync_cursor()?;
        Ok(count)
    }

    /// Appending riffles the fragment after the current item; any other
    /// index keeps it in order there. The sequential list always appends.
    fn insert_shuffled(&mut self, idx: usize, id: FragmentId) -> Result<()> {
        self.sequential
            .insert(self.sequential.size(), id, &mut self.fragments)?;

        if idx == self.shuffled.size() {
            let fractures = self.fragments.get_mut(id)?.enable_shuffle(false);
            debug!("Riffling appended fragment in {} pieces", fractures + 1);
            self.shuffled
                .riffle_after_cursor(id, &mut self.fragments, &mut rand::thread_rng())?;
        } else {
            self.fragments.get_mut(id)?.enable_ordered_shuffle();
            self.shuffled.insert(idx, id, &mut self.fragments)?;
        }
        Ok(())
    }

    pub fn add(&mut self, fragment: Fragment) -> Result<usize> {
        self.insert(self.size(), fragment)
    }

    /// Insert right after the current item (at 0 when nothing is current)
    pub fn insert_next(&mut self, fragment: Fragment) -> Result<usize> {
        self.insert_relative(0, fragment)
    }

    /// Insert `relative_idx` items after the current one
    pub fn insert_relative(&mut self, relative_idx: usize, fragment: Fragment) -> Result<usize> {
        let idx = self.relative_base() + relative_idx;
        self.insert(idx, fragment)
    }

    /// Replace the whole queue with `fragment`
    pub fn set(&mut self, fragment: Fragment) -> Result<usize> {
        self.ensure_capacity(0, fragment.size())?;
        self.clear(false)?;
        self.add(fragment)
    }

    /// Insert already resolved fragments in one transaction
    ///
    /// With `insertion_idx` the fragments keep their order starting
    /// `insertion_idx` items after the current one.
    pub fn add_fragments(
        &mut self,
        fragments: Vec<Fragment>,
        clear: bool,
        insertion_idx: Option<usize>,
    ) -> Result<usize> {
        if fragments.is_empty() {
            return Err(QueueError::NoResults);
        }

        let total: usize = fragments.iter().map(Fragment::size).sum();
        self.ensure_capacity(if clear { 0 } else { self.size() }, total)?;
        if clear {
            self.clear(false)?;
        }

        let start = insertion_idx.map(|relative| self.relative_base() + relative);
        let mut added = 0;
        for fragment in fragments {
            added += match start {
                Some(start) => self.insert(start + added, fragment)?,
                None => self.add(fragment)?,
            };
        }
        Ok(added)
    }

    fn relative_base(&self) -> usize {
        self.curr_idx.map_or(0, |curr| curr + 1)
    }

    // ===== Removal =====

    /// Remove `[from, to)`; returns the number of playables removed
    ///
    /// # Errors
    ///
    /// [`QueueError::InvalidRange`] if `to <= from`,
    /// [`QueueError::IndexOutOfBounds`] if `to > size`.
    pub fn remove(&mut self, from: usize, to: usize) -> Result<usize> {
        if to <= from {
            return Err(QueueError::InvalidRange { from, to });
        }
        let size = self.size();
        if to > size {
            return Err(QueueError::IndexOutOfBounds { index: to, size });
        }

        if self.is_shuffle {
            let pieces = self.shuffled.remove_range(from, to, &mut self.fragments)?;
            for (id, run) in self.original_runs(pieces)? {
                self.sequential.excise(id, run, &mut self.fragments)?;
            }
        } else {
            self.sequential.remove_range(from, to, &mut self.fragments)?;
        }

        let removed = to - from;
        self.curr_idx = match self.curr_idx {
            Some(curr) if curr >= to => Some(curr - removed),
            Some(curr) if curr >= from => from.checked_sub(1),
            curr => curr,
        };
        debug!("Removed tracks {} - {} (queue size {})", from, to, self.size());

        self.sync_cursor()?;
        Ok(removed)
    }

    /// Map pieces removed from the shuffled list to contiguous runs of
    /// original offsets per fragment
    fn original_runs(&self, pieces: Vec<Piece>) -> Result<Vec<(FragmentId, Range<usize>)>> {
        let mut offsets: BTreeMap<FragmentId, Vec<usize>> = BTreeMap::new();
        for (id, range) in pieces {
            let fragment = self.fragments.get(id)?;
            let mapped = offsets.entry(id).or_default();
            for coord in range {
                mapped.push(fragment.original_offset(View::Shuffled, coord)?);
            }
        }

        let mut runs = Vec::new();
        for (id, mut offsets) in offsets {
            offsets.sort_unstable();
            let mut iter = offsets.into_iter();
            let Some(first) = iter.next() else { continue };
            let mut run = first..first + 1;
            for offset in iter {
                if offset == run.end {
                    run.end += 1;
                } else {
                    runs.push((id, run));
                    run = offset..offset + 1;
                }
            }
            runs.push((id, run));
        }
        Ok(runs)
    }

    /// Remove a range relative to the item after the current one
    pub fn remove_relative(&mut self, from: usize, to: usize) -> Result<usize> {
        let base = self.relative_base();
        self.remove(base + from, base + to)
    }

    /// Drop everything, optionally keeping the current item as the only entry
    pub fn clear(&mut self, retain_current: bool) -> Result<()> {
        let retained = match self.active().current_coord()? {
            Some((id, _)) if retain_current => {
                Some(self.fragments.get(id)?.reduce_to_current_playable()?)
            }
            _ => None,
        };

        self.fragments.clear();
        self.sequential.reset();
        self.shuffled.reset();
        self.curr_idx = None;
        info!("Cleared queue (retain current: {})", retained.is_some());

        if let Some(fragment) = retained {
            self.insert(0, fragment)?;
        }
        Ok(())
    }

    // ===== Shuffle =====

    /// Turn shuffle on or off; turning it on while on reshuffles
    pub fn set_shuffle(&mut self, shuffle: bool) -> Result<()> {
        match (shuffle, self.is_shuffle) {
            (true, true) => self.randomize()?,
            (true, false) => self.enable_shuffle()?,
            (false, true) => self.disable_shuffle()?,
            (false, false) => {}
        }
        info!("Shuffle {}", if shuffle { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Reshuffle while shuffle is on, keeping the current item in front
    ///
    /// Does nothing while shuffle is off.
    pub fn randomize(&mut self) -> Result<()> {
        if self.is_shuffle {
            self.enable_shuffle()?;
        }
        Ok(())
    }

    /// Build the shuffled list; the playing fragment's piece holding the
    /// current item is anchored at the front
    fn enable_shuffle(&mut self) -> Result<()> {
        let playing = self.active().current_coord()?.map(|(id, _)| id);
        let order = self.sequential.fragments_in_order();
        self.shuffled.clear(&mut self.fragments)?;

        let mut anchored = Vec::new();
        let mut pieces = Vec::new();
        for id in order {
            let protect = playing == Some(id);
            let fragment = self.fragments.get_mut(id)?;
            let fractures = fragment.enable_shuffle(protect);
            debug!(
                "Shuffled {} fragment of {} tracks into {} pieces",
                fragment.kind(),
                fragment.size(),
                fractures + 1
            );

            for range in fragment.fractures_in(View::Shuffled)? {
                if protect && range.start == 0 {
                    anchored.push((id, range));
                } else {
                    pieces.push((id, range));
                }
            }
        }

        let anchor = anchored.len();
        let order = riffle(anchored, anchor, pieces, &mut rand::thread_rng());
        self.shuffled.from_pieces(order, &mut self.fragments)?;

        self.is_shuffle = true;
        self.curr_idx = playing.map(|_| 0);
        self.sync_cursor()
    }

    /// Drop the shuffled list and find the playing item in sequential order
    fn disable_shuffle(&mut self) -> Result<()> {
        let playing = self.shuffled.current_coord()?;
        for (_, fragment) in self.fragments.iter_mut() {
            fragment.disable_shuffle();
        }
        self.shuffled.clear(&mut self.fragments)?;
        self.is_shuffle = false;

        self.curr_idx = match playing {
            Some((id, _)) => {
                let offset = self.fragments.get(id)?.current_index().ok_or_else(|| {
                    QueueError::invalid_state("playing fragment lost its position")
                })?;
                Some(self.sequential.locate(id, offset, &self.fragments)?)
            }
            None => None,
        };
        self.sync_cursor()
    }

    #[cfg(test)]
    fn lists_agree(&self) -> bool {
        let total = |list: &NodeList| list.walk().map(|(_, node)| node.len).sum::<usize>();
        let mut seq = self.sequential.fragments_in_order();
        let mut shuf = self.shuffled.fragments_in_order();
        seq.sort();
        shuf.sort();
        total(&self.sequential) == self.sequential.size()
            && (!self.is_shuffle
                || (self.sequential.size() == self.shuffled.size() && seq == shuf))
    }
}
