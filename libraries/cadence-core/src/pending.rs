//! Write-once cell for lazily populated metadata
//!
//! Playables enter the queue before their metadata is known. Background
//! loaders complete the cell; readers either peek or block for a bounded time.

use crate::error::{CoreError, Result};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Slot<T> {
    Loading,
    Ready(T),
    Cancelled,
}

/// Value that is filled in at most once, possibly from another thread
#[derive(Debug)]
pub struct Pending<T> {
    slot: Mutex<Slot<T>>,
    ready: Condvar,
}

impl<T: Clone> Pending<T> {
    /// Create an unresolved cell
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Loading),
            ready: Condvar::new(),
        }
    }

    /// Create a cell that is already resolved
    pub fn resolved(value: T) -> Self {
        Self {
            slot: Mutex::new(Slot::Ready(value)),
            ready: Condvar::new(),
        }
    }

    /// Store the value and wake all waiting readers
    ///
    /// Returns `false` if the cell was already completed or cancelled.
    pub fn complete(&self, value: T) -> bool {
        let mut slot = self.slot.lock();
        if !matches!(*slot, Slot::Loading) {
            return false;
        }
        *slot = Slot::Ready(value);
        self.ready.notify_all();
        true
    }

    /// Mark the value as permanently unavailable
    pub fn cancel(&self) -> bool {
        let mut slot = self.slot.lock();
        if !matches!(*slot, Slot::Loading) {
            return false;
        }
        *slot = Slot::Cancelled;
        self.ready.notify_all();
        true
    }

    /// Whether the cell left the loading state
    pub fn is_done(&self) -> bool {
        !matches!(*self.slot.lock(), Slot::Loading)
    }

    /// Current value without waiting, `None` while loading
    pub fn get_now(&self) -> Option<Result<T>> {
        match &*self.slot.lock() {
            Slot::Loading => None,
            Slot::Ready(value) => Some(Ok(value.clone())),
            Slot::Cancelled => Some(Err(CoreError::unavailable("cancelled"))),
        }
    }

    /// Block for at most `timeout` until the value is available
    pub fn get_timeout(&self, timeout: Duration) -> Result<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        loop {
            match &*slot {
                Slot::Ready(value) => return Ok(value.clone()),
                Slot::Cancelled => return Err(CoreError::unavailable("cancelled")),
                Slot::Loading => {
                    if self.ready.wait_until(&mut slot, deadline).timed_out() {
                        return match &*slot {
                            Slot::Ready(value) => Ok(value.clone()),
                            Slot::Cancelled => Err(CoreError::unavailable("cancelled")),
                            Slot::Loading => Err(CoreError::MetadataTimeout),
                        };
                    }
                }
            }
        }
    }
}

impl<T: Clone> Default for Pending<T> {
    fn default() -> Self {
        Self::new()
    }
}
