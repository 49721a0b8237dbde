//! Property-based tests for the playback queue
//!
//! Uses proptest to drive random operation sequences against a plain
//! `Vec` model and to check the shuffle round trip.

mod test_helpers;

use cadence_queue::{Queue, QueueError};
use proptest::prelude::*;
use test_helpers::*;

// ===== Helpers =====

#[derive(Debug, Clone)]
enum Op {
    /// Insert a fragment of `len` tracks at `at` (scaled to the queue size)
    Insert { at: usize, len: usize },
    /// Remove `len` tracks starting at `at` (scaled to the queue size)
    Remove { at: usize, len: usize },
    Next,
    Previous,
    Seek(usize),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..100, 1usize..6).prop_map(|(at, len)| Op::Insert { at, len }),
        2 => (0usize..100, 1usize..4).prop_map(|(at, len)| Op::Remove { at, len }),
        2 => Just(Op::Next),
        1 => Just(Op::Previous),
        1 => (0usize..100).prop_map(Op::Seek),
    ]
}

/// Expected contents and position of the queue
#[derive(Debug, Default)]
struct Model {
    ids: Vec<String>,
    curr: Option<usize>,
}

impl Model {
    fn insert(&mut self, idx: usize, ids: Vec<String>) {
        let count = ids.len();
        let was_empty = self.ids.is_empty();
        self.ids.splice(idx..idx, ids);
        self.curr = match self.curr {
            _ if was_empty => Some(0),
            Some(curr) if idx <= curr => Some(curr + count),
            curr => curr,
        };
    }

    fn remove(&mut self, from: usize, to: usize) {
        self.ids.drain(from..to);
        self.curr = match self.curr {
            Some(curr) if curr >= to => Some(curr - (to - from)),
            Some(curr) if curr >= from => from.checked_sub(1),
            curr => curr,
        };
    }
}

/// Apply `op` to both the queue and the model
fn apply(queue: &Queue, model: &mut Model, op: &Op, serial: usize) {
    let size = model.ids.len();
    match *op {
        Op::Insert { at, len } => {
            let idx = at % (size + 1);
            let prefix = format!("f{}_", serial);
            let fragment = if len == 1 {
                create_single(&format!("{}0", prefix))
            } else {
                create_album(&prefix, len)
            };
            queue.insert(idx, fragment).unwrap();
            model.insert(idx, (0..len).map(|i| format!("{}{}", prefix, i)).collect());
        }
        Op::Remove { at, len } if size > 0 => {
            let from = at % size;
            let to = (from + len).min(size);
            assert_eq!(queue.remove(from, to).unwrap(), to - from);
            model.remove(from, to);
        }
        Op::Remove { .. } => {}
        Op::Next => match queue.iterate() {
            Ok(playable) => {
                let next = model.curr.map_or(0, |curr| curr + 1);
                model.curr = Some(next);
                assert_eq!(playable.id(), model.ids[next]);
            }
            Err(err) => assert_eq!(err, QueueError::NoNextElement),
        },
        Op::Previous => match queue.reverse() {
            Ok(playable) => {
                let prev = model.curr.map(|curr| curr - 1);
                model.curr = prev;
                assert_eq!(Some(playable.id()), prev.map(|p| model.ids[p].as_str()));
            }
            Err(err) => assert_eq!(err, QueueError::NoPreviousElement),
        },
        Op::Seek(idx) if size > 0 => {
            queue.set_position(idx % size).unwrap();
            model.curr = Some(idx % size);
        }
        Op::Seek(_) => {}
    }
}

fn check(queue: &Queue, model: &Model) -> Result<(), TestCaseError> {
    prop_assert_eq!(queue.size(), model.ids.len());
    prop_assert_eq!(queue_ids(queue), model.ids.clone());
    prop_assert_eq!(queue.position(), model.curr);
    if let Some(curr) = model.curr {
        prop_assert_eq!(current_id(queue), model.ids[curr].clone());
    }
    Ok(())
}

// ===== Property Tests =====

proptest! {
    /// Property: the queue behaves like a flat list under any operation sequence
    #[test]
    fn queue_matches_flat_model(ops in prop::collection::vec(arbitrary_op(), 1..40)) {
        let queue = Queue::new();
        let mut model = Model::default();

        for (serial, op) in ops.iter().enumerate() {
            apply(&queue, &mut model, op, serial);
            check(&queue, &model)?;
        }
    }

    /// Property: inserting leaves the prefix and suffix untouched
    #[test]
    fn insertion_law(
        initial in prop::collection::vec(1usize..6, 1..6),
        at in 0usize..100,
        len in 1usize..8,
    ) {
        let queue = Queue::new();
        for (i, size) in initial.iter().enumerate() {
            queue.add(create_album(&format!("i{}_", i), *size)).unwrap();
        }
        let before = queue_ids(&queue);
        let n = before.len();
        let idx = at % (n + 1);

        prop_assert_eq!(queue.insert(idx, create_album("new", len)).unwrap(), len);

        let after = queue_ids(&queue);
        prop_assert_eq!(after.len(), n + len);
        prop_assert_eq!(&after[..idx], &before[..idx]);
        prop_assert_eq!(&after[idx + len..], &before[idx..]);
        let inserted: Vec<String> = (0..len).map(|i| format!("new{}", i)).collect();
        prop_assert_eq!(&after[idx..idx + len], &inserted[..]);
    }

    /// Property: removing a range closes the gap
    #[test]
    fn removal_law(
        initial in prop::collection::vec(1usize..6, 1..6),
        at in 0usize..100,
        len in 1usize..10,
    ) {
        let queue = Queue::new();
        for (i, size) in initial.iter().enumerate() {
            queue.add(create_album(&format!("i{}_", i), *size)).unwrap();
        }
        let before = queue_ids(&queue);
        let n = before.len();
        let from = at % n;
        let to = (from + len).min(n);

        queue.remove(from, to).unwrap();

        let mut expected = before.clone();
        expected.drain(from..to);
        prop_assert_eq!(queue_ids(&queue), expected);
        prop_assert_eq!(queue.size(), n - (to - from));
    }

    /// Property: shuffling on and off restores order and position
    #[test]
    fn shuffle_round_trip(
        initial in prop::collection::vec(1usize..8, 1..8),
        seek in 0usize..100,
    ) {
        let queue = Queue::new();
        for (i, size) in initial.iter().enumerate() {
            queue.add(create_album(&format!("i{}_", i), *size)).unwrap();
        }
        queue.set_position(seek % queue.size()).unwrap();
        let before = queue_ids(&queue);
        let position = queue.position();

        queue.set_shuffle(true).unwrap();
        prop_assert_eq!(queue.position(), Some(0));
        prop_assert_eq!(queue.size(), before.len());
        let mut shuffled = queue_ids(&queue);
        shuffled.sort();
        let mut sorted = before.clone();
        sorted.sort();
        prop_assert_eq!(shuffled, sorted);

        queue.set_shuffle(false).unwrap();
        prop_assert_eq!(queue_ids(&queue), before);
        prop_assert_eq!(queue.position(), position);
    }

    /// Property: mutating while shuffled keeps both orders the same size
    #[test]
    fn shuffled_mutations_keep_sizes_in_step(
        initial in prop::collection::vec(1usize..6, 1..6),
        ops in prop::collection::vec(arbitrary_op(), 1..20),
    ) {
        let queue = Queue::new();
        for (i, size) in initial.iter().enumerate() {
            queue.add(create_album(&format!("i{}_", i), *size)).unwrap();
        }
        queue.set_shuffle(true).unwrap();

        for (serial, op) in ops.iter().enumerate() {
            let size = queue.size();
            match *op {
                Op::Insert { at, len } => {
                    queue.insert(at % (size + 1), create_album(&format!("f{}_", serial), len)).unwrap();
                }
                Op::Remove { at, len } if size > 0 => {
                    let from = at % size;
                    queue.remove(from, (from + len).min(size)).unwrap();
                }
                Op::Next => { let _ = queue.iterate(); }
                Op::Previous => { let _ = queue.reverse(); }
                _ => {}
            }
            let shuffled = queue_ids(&queue);
            prop_assert_eq!(shuffled.len(), queue.size());
            prop_assert!(!queue.position().is_some_and(|p| p >= queue.size()));
        }

        let mut shuffled = queue_ids(&queue);
        let playing = queue.get_current().ok().map(|p| p.id().to_string());
        queue.set_shuffle(false).unwrap();

        let mut sequential = queue_ids(&queue);
        prop_assert_eq!(sequential.len(), shuffled.len());
        shuffled.sort();
        sequential.sort();
        prop_assert_eq!(sequential, shuffled);
        prop_assert_eq!(queue.get_current().ok().map(|p| p.id().to_string()), playing);
    }
}
