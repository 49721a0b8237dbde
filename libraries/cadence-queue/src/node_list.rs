//! Doubly linked list of fracture nodes
//!
//! Each node references one fracture of a fragment in the list's coordinate
//! space ([`View`]). The list owns one reference count on the fragment per
//! node and returns it on unlink.

use crate::arena::{arena_key, Arena};
use crate::error::{QueueError, Result};
use crate::fragment::{FragmentId, FragmentStore};
use crate::shuffle::riffle;
use crate::types::View;
use cadence_core::Playable;
use rand::Rng;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

arena_key!(NodeId);

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub fragment: FragmentId,

    /// Start offset of the fracture in view coordinates
    pub start: usize,
    pub len: usize,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
}

impl Node {
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// Playing position: a node and an offset inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub node: NodeId,
    pub offset: usize,
}

/// Fracture removed from a list
pub(crate) type Piece = (FragmentId, Range<usize>);

#[derive(Debug)]
pub(crate) struct NodeList {
    view: View,
    nodes: Arena<NodeId, Node>,
    by_fracture: HashMap<(FragmentId, usize), NodeId>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    size: usize,
    cursor: Option<Cursor>,
}

impl NodeList {
    pub fn new(view: View) -> Self {
        Self {
            view,
            nodes: Arena::new(),
            by_fracture: HashMap::new(),
            head: None,
            tail: None,
            size: 0,
            cursor: None,
        }
    }

    /// Number of playables covered by the list
    pub fn size(&self) -> usize {
        self.size
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[cfg(test)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| QueueError::invalid_state(format!("dangling node {:?}", id)))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| QueueError::invalid_state(format!("dangling node {:?}", id)))
    }

    /// Nodes from head to tail
    pub fn walk(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        let lookup = move |id: NodeId| self.nodes.get(id).map(|node| (id, node));
        std::iter::successors(self.head.and_then(lookup), move |(_, node)| {
            node.next.and_then(lookup)
        })
    }

    /// Distinct fragments in list order
    pub fn fragments_in_order(&self) -> Vec<FragmentId> {
        let mut seen = Vec::new();
        for (_, node) in self.walk() {
            if !seen.contains(&node.fragment) {
                seen.push(node.fragment);
            }
        }
        seen
    }

    /// Node holding global index `idx` and the offset inside it
    ///
    /// Walks from whichever end is closer.
    pub fn node_at_index(&self, idx: usize) -> Result<(NodeId, usize)> {
        if idx >= self.size {
            return Err(QueueError::IndexOutOfBounds {
                index: idx,
                size: self.size,
            });
        }

        if idx <= self.size / 2 {
            let mut start = 0;
            let mut current = self.head;
            while let Some(id) = current {
                let node = self.node(id)?;
                if idx < start + node.len {
                    return Ok((id, idx - start));
                }
                start += node.len;
                current = node.next;
            }
        } else {
            let mut end = self.size;
            let mut current = self.tail;
            while let Some(id) = current {
                let node = self.node(id)?;
                let start = end - node.len;
                if idx >= start {
                    return Ok((id, idx - start));
                }
                end = start;
                current = node.prev;
            }
        }

        Err(QueueError::invalid_state(format!(
            "node list shorter than its size {}",
            self.size
        )))
    }

    /// Global index of the first item of `id`
    fn position_of(&self, id: NodeId) -> Result<usize> {
        let mut position = 0;
        for (node_id, node) in self.walk() {
            if node_id == id {
                return Ok(position);
            }
            position += node.len;
        }
        Err(QueueError::invalid_state(format!("node {:?} is not linked", id)))
    }

    /// Global index of the item at `coord` of fragment `fragment`
    pub fn locate(&self, fragment: FragmentId, coord: usize, store: &FragmentStore) -> Result<usize> {
        let range = store
            .get(fragment)?
            .fracture_containing(self.view, coord)?
            .ok_or_else(|| {
                QueueError::invalid_state(format!("offset {} of {:?} is not queued", coord, fragment))
            })?;
        let id = self.node_for(fragment, range.start)?;
        Ok(self.position_of(id)? + (coord - range.start))
    }

    fn node_for(&self, fragment: FragmentId, start: usize) -> Result<NodeId> {
        self.by_fracture
            .get(&(fragment, start))
            .copied()
            .ok_or_else(|| {
                QueueError::invalid_state(format!(
                    "no node for fracture {} of {:?}",
                    start, fragment
                ))
            })
    }

    /// Link a new node between `prev` and `next` and take a fragment reference
    fn link(
        &mut self,
        prev: Option<NodeId>,
        next: Option<NodeId>,
        fragment: FragmentId,
        range: Range<usize>,
        store: &mut FragmentStore,
    ) -> Result<NodeId> {
        store.retain(fragment)?;

        let len = range.len();
        let id = self.nodes.insert(Node {
            fragment,
            start: range.start,
            len,
            prev,
            next,
        });

        match prev {
            Some(prev) => self.node_mut(prev)?.next = Some(id),
            None => self.head = Some(id),
        }
        match next {
            Some(next) => self.node_mut(next)?.prev = Some(id),
            None => self.tail = Some(id),
        }

        self.by_fracture.insert((fragment, range.start), id);
        self.size += len;
        Ok(id)
    }

    pub fn push_back(
        &mut self,
        fragment: FragmentId,
        range: Range<usize>,
        store: &mut FragmentStore,
    ) -> Result<NodeId> {
        self.link(self.tail, None, fragment, range, store)
    }

    /// Split `id` so that a new node starts `offset` items into it
    ///
    /// Returns the new (second) node.
    pub fn split(&mut self, id: NodeId, offset: usize, store: &mut FragmentStore) -> Result<NodeId> {
        let node = self.node(id)?.clone();
        if offset == 0 || offset >= node.len {
            return Err(QueueError::InvalidFracture {
                offset,
                size: node.len,
            });
        }

        store
            .get_mut(node.fragment)?
            .split(self.view, node.start + offset)?;

        let tail_len = node.len - offset;
        self.node_mut(id)?.len = offset;
        self.size -= tail_len;
        let second = self.link(
            Some(id),
            node.next,
            node.fragment,
            node.start + offset..node.start + node.len,
            store,
        )?;

        if let Some(cursor) = self.cursor {
            if cursor.node == id && cursor.offset >= offset {
                self.cursor = Some(Cursor {
                    node: second,
                    offset: cursor.offset - offset,
                });
            }
        }

        Ok(second)
    }

    /// Remove `id` and its fracture, releasing the fragment reference
    fn unlink(&mut self, id: NodeId, store: &mut FragmentStore) -> Result<Piece> {
        let node = self
            .nodes
            .remove(id)
            .ok_or_else(|| QueueError::invalid_state(format!("dangling node {:?}", id)))?;

        match node.prev {
            Some(prev) => self.node_mut(prev)?.next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next)?.prev = node.prev,
            None => self.tail = node.prev,
        }

        self.by_fracture.remove(&(node.fragment, node.start));
        self.size -= node.len;
        if self.cursor.is_some_and(|cursor| cursor.node == id) {
            self.cursor = None;
        }

        let range = store
            .get_mut(node.fragment)?
            .drop_fracture(self.view, node.start)?;
        store.release(node.fragment)?;
        Ok((node.fragment, range))
    }

    /// Insert every fracture of `fragment` (in this view) at global index `idx`
    ///
    /// Returns the number of playables inserted.
    pub fn insert(&mut self, idx: usize, fragment: FragmentId, store: &mut FragmentStore) -> Result<usize> {
        if idx > self.size {
            return Err(QueueError::IndexOutOfBounds {
                index: idx,
                size: self.size,
            });
        }

        let fractures = store.get(fragment)?.fractures_in(self.view)?;

        let (mut prev, next) = if idx == self.size {
            (self.tail, None)
        } else {
            let (id, offset) = self.node_at_index(idx)?;
            if offset == 0 {
                (self.node(id)?.prev, Some(id))
            } else {
                let second = self.split(id, offset, store)?;
                (Some(id), Some(second))
            }
        };

        let mut inserted = 0;
        for range in fractures {
            inserted += range.len();
            prev = Some(self.link(prev, next, fragment, range, store)?);
        }
        Ok(inserted)
    }

    /// Remove global indices `[from, to)` and return the removed fractures
    pub fn remove_range(&mut self, from: usize, to: usize, store: &mut FragmentStore) -> Result<Vec<Piece>> {
        if to <= from {
            return Err(QueueError::InvalidRange { from, to });
        }
        if to > self.size {
            return Err(QueueError::IndexOutOfBounds {
                index: to,
                size: self.size,
            });
        }

        let (mut id, offset) = self.node_at_index(from)?;
        if offset > 0 {
            id = self.split(id, offset, store)?;
        }

        let mut remaining = to - from;
        let mut pieces = Vec::new();
        while remaining > 0 {
            let len = self.node(id)?.len;
            if len > remaining {
                self.split(id, remaining, store)?;
            }
            let next = self.node(id)?.next;
            let piece = self.unlink(id, store)?;
            remaining -= piece.1.len();
            pieces.push(piece);

            if remaining > 0 {
                id = next.ok_or_else(|| QueueError::invalid_state("reached end of node list"))?;
            }
        }
        Ok(pieces)
    }

    /// Remove the coordinates `range` of `fragment` wherever they sit in the list
    ///
    /// Every coordinate in `range` must be queued.
    pub fn excise(&mut self, fragment: FragmentId, range: Range<usize>, store: &mut FragmentStore) -> Result<()> {
        let mut at = range.start;
        while at < range.end {
            let fracture = store
                .get(fragment)?
                .fracture_containing(self.view, at)?
                .ok_or_else(|| {
                    QueueError::invalid_state(format!("offset {} of {:?} is not queued", at, fragment))
                })?;

            let mut id = self.node_for(fragment, fracture.start)?;
            if fracture.start < at {
                id = self.split(id, at - fracture.start, store)?;
            }
            if fracture.end > range.end {
                self.split(id, range.end - at, store)?;
            }
            self.unlink(id, store)?;
            at = fracture.end.min(range.end);
        }
        Ok(())
    }

    /// Insert the fractures of `fragment` at random positions after the cursor
    pub fn riffle_after_cursor<R: Rng + ?Sized>(
        &mut self,
        fragment: FragmentId,
        store: &mut FragmentStore,
        rng: &mut R,
    ) -> Result<usize> {
        enum Slot {
            Existing(NodeId),
            New(Range<usize>),
        }

        let mut following = match self.cursor {
            Some(cursor) => self.node(cursor.node)?.next,
            None => self.head,
        };
        let mut existing = Vec::new();
        while let Some(id) = following {
            existing.push(Slot::Existing(id));
            following = self.node(id)?.next;
        }

        let pieces: Vec<Slot> = store
            .get(fragment)?
            .fractures_in(self.view)?
            .into_iter()
            .map(Slot::New)
            .collect();
        let order = riffle(existing, 0, pieces, rng);

        // each new piece is linked in front of the next existing node
        let mut before = vec![None; order.len()];
        let mut next_existing = None;
        for (i, slot) in order.iter().enumerate().rev() {
            before[i] = next_existing;
            if let Slot::Existing(id) = slot {
                next_existing = Some(*id);
            }
        }

        let mut inserted = 0;
        for (slot, next) in order.into_iter().zip(before) {
            if let Slot::New(range) = slot {
                let prev = match next {
                    Some(next) => self.node(next)?.prev,
                    None => self.tail,
                };
                inserted += range.len();
                self.link(prev, next, fragment, range, store)?;
            }
        }
        Ok(inserted)
    }

    /// Replace the contents with `pieces`, in order
    pub fn from_pieces(&mut self, pieces: Vec<Piece>, store: &mut FragmentStore) -> Result<()> {
        self.clear(store)?;
        for (fragment, range) in pieces {
            self.push_back(fragment, range, store)?;
        }
        Ok(())
    }

    /// Unlink every node, releasing fragment references
    ///
    /// Fragment partitions are left untouched.
    pub fn clear(&mut self, store: &mut FragmentStore) -> Result<()> {
        let fragments: Vec<FragmentId> = self.walk().map(|(_, node)| node.fragment).collect();
        self.nodes = Arena::new();
        self.by_fracture.clear();
        self.head = None;
        self.tail = None;
        self.size = 0;
        self.cursor = None;

        for fragment in fragments {
            store.release(fragment)?;
        }
        Ok(())
    }

    /// Drop the list without touching the store (the store is being reset too)
    pub fn reset(&mut self) {
        *self = Self::new(self.view);
    }

    pub fn clear_cursor(&mut self) {
        self.cursor = None;
    }

    fn fracture_index(&self, node: &Node, store: &FragmentStore) -> Result<usize> {
        store.get(node.fragment)?.fracture_index_of(self.view, node.start)
    }

    fn place(&mut self, cursor: Cursor, store: &mut FragmentStore) -> Result<()> {
        let node = self.node(cursor.node)?.clone();
        let fracture_idx = self.fracture_index(&node, store)?;
        store
            .get_mut(node.fragment)?
            .set_position(fracture_idx, cursor.offset)?;
        self.cursor = Some(cursor);
        Ok(())
    }

    /// Move the cursor to global index `idx`
    pub fn seek(&mut self, idx: usize, store: &mut FragmentStore) -> Result<()> {
        let (node, offset) = self.node_at_index(idx)?;
        self.place(Cursor { node, offset }, store)
    }

    /// Step the cursor forward one item
    pub fn advance(&mut self, store: &mut FragmentStore) -> Result<()> {
        let cursor = self.cursor.ok_or(QueueError::NoNextElement)?;
        let node = self.node(cursor.node)?.clone();
        let fracture_idx = self.fracture_index(&node, store)?;

        if store.get(node.fragment)?.has_next(fracture_idx)? && cursor.offset + 1 < node.len {
            return self.place(
                Cursor {
                    node: cursor.node,
                    offset: cursor.offset + 1,
                },
                store,
            );
        }

        let next = node.next.ok_or(QueueError::NoNextElement)?;
        if self.node(next)?.fragment != node.fragment {
            store.get_mut(node.fragment)?.clear_position();
        }
        self.place(Cursor { node: next, offset: 0 }, store)
    }

    /// Step the cursor back one item
    pub fn retreat(&mut self, store: &mut FragmentStore) -> Result<()> {
        let cursor = self.cursor.ok_or(QueueError::NoPreviousElement)?;
        let node = self.node(cursor.node)?.clone();
        let fracture_idx = self.fracture_index(&node, store)?;

        if store.get(node.fragment)?.has_previous(fracture_idx)? && cursor.offset > 0 {
            return self.place(
                Cursor {
                    node: cursor.node,
                    offset: cursor.offset - 1,
                },
                store,
            );
        }

        let prev = node.prev.ok_or(QueueError::NoPreviousElement)?;
        let prev_node = self.node(prev)?;
        let (prev_fragment, offset) = (prev_node.fragment, prev_node.len - 1);
        if prev_fragment != node.fragment {
            store.get_mut(node.fragment)?.clear_position();
        }
        self.place(Cursor { node: prev, offset }, store)
    }

    /// Fracture index of a node in this view
    pub fn fracture_index_of(&self, id: NodeId, store: &FragmentStore) -> Result<usize> {
        self.fracture_index(self.node(id)?, store)
    }

    pub fn playables_of(&self, id: NodeId, store: &FragmentStore) -> Result<Vec<Arc<dyn Playable>>> {
        let node = self.node(id)?;
        let fragment = store.get(node.fragment)?;
        node.range()
            .map(|coord| fragment.playable_in_view(self.view, coord))
            .collect()
    }

    /// All playables in list order
    pub fn playables(&self, store: &FragmentStore) -> Result<Vec<Arc<dyn Playable>>> {
        let mut playables = Vec::with_capacity(self.size);
        for (id, _) in self.walk() {
            playables.extend(self.playables_of(id, store)?);
        }
        Ok(playables)
    }

    pub fn playable_at(&self, idx: usize, store: &FragmentStore) -> Result<Arc<dyn Playable>> {
        let (id, offset) = self.node_at_index(idx)?;
        let node = self.node(id)?;
        store
            .get(node.fragment)?
            .playable_in_view(self.view, node.start + offset)
    }

    /// Playable under the cursor
    pub fn current(&self, store: &FragmentStore) -> Result<Option<Arc<dyn Playable>>> {
        let Some(cursor) = self.cursor else {
            return Ok(None);
        };
        let node = self.node(cursor.node)?;
        store
            .get(node.fragment)?
            .playable_in_view(self.view, node.start + cursor.offset)
            .map(Some)
    }

    /// Fragment and view coordinate under the cursor
    pub fn current_coord(&self) -> Result<Option<(FragmentId, usize)>> {
        let Some(cursor) = self.cursor else {
            return Ok(None);
        };
        let node = self.node(cursor.node)?;
        Ok(Some((node.fragment, node.start + cursor.offset)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Fragment;
    use cadence_core::{ContainerKind, Source, Track, TrackMetadata};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    fn album(prefix: &str, size: usize) -> Fragment {
        let playables = (0..size)
            .map(|i| {
                Track::resolved(
                    format!("{}{}", prefix, i),
                    Source::Local,
                    TrackMetadata::new(format!("{} {}", prefix, i), None, Duration::from_secs(200)),
                )
                .into_playable()
            })
            .collect();
        Fragment::multi(ContainerKind::Album, playables).unwrap()
    }

    fn ids(list: &NodeList, store: &FragmentStore) -> Vec<String> {
        list.playables(store)
            .unwrap()
            .iter()
            .map(|p| p.id().to_string())
            .collect()
    }

    #[test]
    fn insert_in_middle_splits_node() {
        let mut store = FragmentStore::new();
        let mut list = NodeList::new(View::Sequential);
        let a = store.insert(album("a", 4));
        let b = store.insert(album("b", 2));

        list.insert(0, a, &mut store).unwrap();
        list.insert(2, b, &mut store).unwrap();

        assert_eq!(ids(&list, &store), vec!["a0", "a1", "b0", "b1", "a2", "a3"]);
        assert_eq!(list.size(), 6);
        assert_eq!(list.node_count(), 3);
        assert_eq!(store.ref_count(a), 2);
        assert_eq!(
            store.get(a).unwrap().fractures_in(View::Sequential).unwrap(),
            vec![0..2, 2..4]
        );
    }

    #[test]
    fn node_at_index_from_both_ends() {
        let mut store = FragmentStore::new();
        let mut list = NodeList::new(View::Sequential);
        for (i, size) in [3, 1, 4].into_iter().enumerate() {
            let id = store.insert(album(&format!("f{}-", i), size));
            list.insert(list.size(), id, &mut store).unwrap();
        }

        for idx in 0..list.size() {
            let expected = ids(&list, &store)[idx].clone();
            assert_eq!(list.playable_at(idx, &store).unwrap().id(), expected);
        }
        assert!(list.node_at_index(8).is_err());
    }

    #[test]
    fn remove_range_drops_unreferenced_fragments() {
        let mut store = FragmentStore::new();
        let mut list = NodeList::new(View::Sequential);
        let a = store.insert(album("a", 3));
        let b = store.insert(album("b", 2));
        list.insert(0, a, &mut store).unwrap();
        list.insert(3, b, &mut store).unwrap();

        let pieces = list.remove_range(1, 5, &mut store).unwrap();

        assert_eq!(pieces, vec![(a, 1..3), (b, 0..2)]);
        assert_eq!(ids(&list, &store), vec!["a0"]);
        assert!(store.get(b).is_err());
        assert_eq!(store.get(a).unwrap().size(), 1);
    }

    #[test]
    fn excise_cuts_across_nodes() {
        let mut store = FragmentStore::new();
        let mut list = NodeList::new(View::Sequential);
        let a = store.insert(album("a", 6));
        let b = store.insert(album("b", 1));
        list.insert(0, a, &mut store).unwrap();
        list.insert(3, b, &mut store).unwrap();

        list.excise(a, 2..5, &mut store).unwrap();

        assert_eq!(ids(&list, &store), vec!["a0", "a1", "b0", "a5"]);
        assert_eq!(list.locate(a, 5, &store).unwrap(), 3);
    }

    #[test]
    fn cursor_crosses_nodes() {
        let mut store = FragmentStore::new();
        let mut list = NodeList::new(View::Sequential);
        let a = store.insert(album("a", 2));
        let b = store.insert(album("b", 2));
        list.insert(0, a, &mut store).unwrap();
        list.insert(2, b, &mut store).unwrap();

        list.seek(1, &mut store).unwrap();
        list.advance(&mut store).unwrap();
        assert_eq!(list.current(&store).unwrap().unwrap().id(), "b0");
        assert_eq!(store.get(a).unwrap().current_index(), None);

        list.advance(&mut store).unwrap();
        assert_eq!(
            list.advance(&mut store).unwrap_err(),
            QueueError::NoNextElement
        );

        list.retreat(&mut store).unwrap();
        list.retreat(&mut store).unwrap();
        assert_eq!(list.current(&store).unwrap().unwrap().id(), "a1");
    }

    #[test]
    fn split_moves_cursor_to_second_half() {
        let mut store = FragmentStore::new();
        let mut list = NodeList::new(View::Sequential);
        let a = store.insert(album("a", 5));
        list.insert(0, a, &mut store).unwrap();
        list.seek(3, &mut store).unwrap();

        let b = store.insert(album("b", 1));
        list.insert(2, b, &mut store).unwrap();

        assert_eq!(list.current(&store).unwrap().unwrap().id(), "a3");
        assert_eq!(list.cursor().unwrap().offset, 1);
    }

    #[test]
    fn riffle_stays_after_cursor() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut store = FragmentStore::new();
            let mut list = NodeList::new(View::Sequential);
            let a = store.insert(album("a", 3));
            list.insert(0, a, &mut store).unwrap();
            list.seek(0, &mut store).unwrap();
            list.split(list.head().unwrap(), 1, &mut store).unwrap();

            let b = store.insert(album("b", 4));
            store.get_mut(b).unwrap().add_fracture(2).unwrap();
            list.riffle_after_cursor(b, &mut store, &mut rng).unwrap();

            let order = ids(&list, &store);
            assert_eq!(order.len(), 7);
            assert_eq!(order[0], "a0");
            let pos = |id: &str| order.iter().position(|o| o == id).unwrap();
            assert!(pos("a1") < pos("a2"));
            assert!(pos("b0") < pos("b1"));
            assert!(pos("b2") < pos("b3"));
        }
    }

    #[test]
    fn clear_releases_references() {
        let mut store = FragmentStore::new();
        let mut list = NodeList::new(View::Sequential);
        let a = store.insert(album("a", 2));
        list.insert(0, a, &mut store).unwrap();

        list.clear(&mut store).unwrap();

        assert!(list.is_empty());
        assert!(list.head().is_none());
        assert!(store.is_empty());
    }
}
