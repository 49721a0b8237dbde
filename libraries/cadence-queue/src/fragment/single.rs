//! Fragment holding exactly one playable

use crate::error::{QueueError, Result};
use cadence_core::Playable;
use std::ops::Range;
use std::sync::Arc;

/// Single-item fragment
///
/// Never fractured and never shuffled. Its only coordinate is 0 in both views.
#[derive(Debug, Clone)]
pub struct SingleFragment {
    playable: Arc<dyn Playable>,
    played: bool,
}

impl SingleFragment {
    pub fn new(playable: Arc<dyn Playable>) -> Self {
        Self {
            playable,
            played: false,
        }
    }

    fn check(fracture_idx: usize) -> Result<()> {
        if fracture_idx == 0 {
            Ok(())
        } else {
            Err(QueueError::IndexOutOfBounds {
                index: fracture_idx,
                size: 1,
            })
        }
    }

    pub fn size(&self) -> usize {
        1
    }

    pub fn add_fracture(&mut self, _offset: usize) -> Result<usize> {
        Err(QueueError::CannotFracture)
    }

    pub fn ordered_fractures(&self) -> Vec<Range<usize>> {
        vec![0..1]
    }

    pub fn size_of_fracture(&self, fracture_idx: usize) -> Result<usize> {
        Self::check(fracture_idx)?;
        Ok(1)
    }

    pub fn playable(&self) -> Arc<dyn Playable> {
        Arc::clone(&self.playable)
    }

    pub fn playables_in_fracture(&self, fracture_idx: usize) -> Result<Vec<Arc<dyn Playable>>> {
        Self::check(fracture_idx)?;
        Ok(vec![self.playable()])
    }

    pub fn next_playables_in_fracture(
        &self,
        fracture_idx: usize,
        limit: usize,
    ) -> Result<Vec<Arc<dyn Playable>>> {
        Self::check(fracture_idx)?;
        if self.played || limit == 0 {
            Ok(Vec::new())
        } else {
            Ok(vec![self.playable()])
        }
    }

    pub fn previous_playables_in_fracture(
        &self,
        fracture_idx: usize,
        _limit: usize,
    ) -> Result<Vec<Arc<dyn Playable>>> {
        Self::check(fracture_idx)?;
        // the item is never "before" itself
        Ok(Vec::new())
    }

    pub fn current_index(&self) -> Option<usize> {
        self.played.then_some(0)
    }

    pub fn current_index_within_fracture(&self, fracture_idx: usize) -> Result<Option<usize>> {
        Self::check(fracture_idx)?;
        Ok(self.current_index())
    }

    pub fn current(&self) -> Arc<dyn Playable> {
        self.playable()
    }

    pub fn has_next(&self, fracture_idx: usize) -> Result<bool> {
        Self::check(fracture_idx)?;
        Ok(!self.played)
    }

    pub fn has_previous(&self, fracture_idx: usize) -> Result<bool> {
        Self::check(fracture_idx)?;
        Ok(false)
    }

    pub fn next(&mut self) -> Result<Arc<dyn Playable>> {
        if self.played {
            return Err(QueueError::NoNextElement);
        }
        self.played = true;
        Ok(self.playable())
    }

    pub fn previous(&mut self) -> Result<Arc<dyn Playable>> {
        Err(QueueError::NoPreviousElement)
    }

    pub fn peek_next(&self) -> Option<Arc<dyn Playable>> {
        (!self.played).then(|| self.playable())
    }

    pub fn set_position(&mut self, fracture_idx: usize, offset: usize) -> Result<()> {
        Self::check(fracture_idx)?;
        if offset != 0 {
            return Err(QueueError::IndexOutOfBounds {
                index: offset,
                size: 1,
            });
        }
        self.played = true;
        Ok(())
    }

    pub fn reset_position_to_start(&mut self) {
        self.played = true;
    }

    pub fn reset_position_to_end(&mut self) {
        self.played = true;
    }

    pub fn clear_position(&mut self) {
        self.played = false;
    }
}
