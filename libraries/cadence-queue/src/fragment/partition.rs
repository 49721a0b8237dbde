//! Fracture boundaries of a fragment in one coordinate space
//!
//! A partition maps the start of every live fracture to its exclusive end.
//! Fractures never overlap. Removed items leave holes that no fracture
//! covers. Fracture indices are the rank of the start offset and are
//! derived on every query, so splitting renumbers nothing in place.

use crate::error::{QueueError, Result};
use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Partition {
    fractures: BTreeMap<usize, usize>,
}

impl Partition {
    /// One fracture covering `[0, len)`
    pub fn whole(len: usize) -> Self {
        let mut fractures = BTreeMap::new();
        if len > 0 {
            fractures.insert(0, len);
        }
        Self { fractures }
    }

    /// Fractures of `[0, len)` cut at ascending `offsets`
    ///
    /// Offsets that are not strictly inside the previous fracture are ignored.
    pub fn split_at(len: usize, offsets: &[usize]) -> Self {
        let mut fractures = BTreeMap::new();
        let mut start = 0;
        for &end in offsets.iter().chain(std::iter::once(&len)) {
            if end > start && end <= len {
                fractures.insert(start, end);
                start = end;
            }
        }
        Self { fractures }
    }

    /// Number of live items
    pub fn len(&self) -> usize {
        self.fractures.iter().map(|(start, end)| end - start).sum()
    }

    pub fn fracture_count(&self) -> usize {
        self.fractures.len()
    }

    /// Fractures in ascending offset order
    pub fn ordered(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.fractures.iter().map(|(&start, &end)| start..end)
    }

    /// Live coordinates in ascending order
    pub fn coords(&self) -> impl Iterator<Item = usize> + '_ {
        self.ordered().flatten()
    }

    pub fn get(&self, fracture_idx: usize) -> Result<Range<usize>> {
        self.ordered()
            .nth(fracture_idx)
            .ok_or(QueueError::IndexOutOfBounds {
                index: fracture_idx,
                size: self.fracture_count(),
            })
    }

    /// Index of the fracture starting at `start`
    pub fn index_of(&self, start: usize) -> Option<usize> {
        if self.fractures.contains_key(&start) {
            Some(self.fractures.range(..start).count())
        } else {
            None
        }
    }

    /// Fracture containing `coord`, if it is live
    pub fn containing(&self, coord: usize) -> Option<Range<usize>> {
        self.fractures
            .range(..=coord)
            .next_back()
            .filter(|&(_, &end)| coord < end)
            .map(|(&start, &end)| start..end)
    }

    /// Split the fracture containing `at` so that a new fracture starts there
    ///
    /// Returns the index of the new fracture.
    pub fn split(&mut self, at: usize) -> Result<usize> {
        let range = self
            .containing(at)
            .filter(|range| range.start < at)
            .ok_or(QueueError::InvalidFracture {
                offset: at,
                size: self.len(),
            })?;

        self.fractures.insert(range.start, at);
        self.fractures.insert(at, range.end);
        self.index_of(at).ok_or_else(|| {
            QueueError::invalid_state(format!("fracture at {} vanished after split", at))
        })
    }

    /// Drop the fracture starting at `start`, returning its end
    pub fn remove(&mut self, start: usize) -> Option<usize> {
        self.fractures.remove(&start)
    }

    pub fn first(&self) -> Option<usize> {
        self.fractures.keys().next().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.fractures.values().next_back().map(|end| end - 1)
    }

    /// Next live coordinate after `coord`
    pub fn successor(&self, coord: usize) -> Option<usize> {
        if let Some((_, &end)) = self.fractures.range(..=coord + 1).next_back() {
            if end > coord + 1 {
                return Some(coord + 1);
            }
        }
        self.fractures.range(coord + 2..).next().map(|(&start, _)| start)
    }

    /// Previous live coordinate before `coord`
    pub fn predecessor(&self, coord: usize) -> Option<usize> {
        self.fractures
            .range(..coord)
            .next_back()
            .map(|(_, &end)| (coord - 1).min(end - 1))
    }
}
