//! Slot arena addressed by typed handles
//!
//! Nodes and fragments refer to each other through handles instead of
//! pointers, so ownership stays with the arena and cycles cannot form.

use std::marker::PhantomData;

/// Handle type usable as an arena key
pub(crate) trait ArenaKey: Copy {
    fn from_index(index: usize) -> Self;
    fn index(self) -> usize;
}

macro_rules! arena_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $crate::arena::ArenaKey for $name {
            fn from_index(index: usize) -> Self {
                Self(index)
            }

            fn index(self) -> usize {
                self.0
            }
        }
    };
}

pub(crate) use arena_key;

#[derive(Debug, Clone)]
pub(crate) struct Arena<K, T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
    _key: PhantomData<K>,
}

impl<K: ArenaKey, T> Arena<K, T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
            _key: PhantomData,
        }
    }

    pub fn insert(&mut self, value: T) -> K {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            self.slots[index] = Some(value);
            K::from_index(index)
        } else {
            self.slots.push(Some(value));
            K::from_index(self.slots.len() - 1)
        }
    }

    pub fn remove(&mut self, key: K) -> Option<T> {
        let value = self.slots.get_mut(key.index())?.take()?;
        self.free.push(key.index());
        self.len -= 1;
        Some(value)
    }

    pub fn get(&self, key: K) -> Option<&T> {
        self.slots.get(key.index())?.as_ref()
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.slots.get_mut(key.index())?.as_mut()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_mut().map(|value| (K::from_index(index), value)))
    }
}

impl<K: ArenaKey, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
