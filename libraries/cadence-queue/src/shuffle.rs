//! Shuffle algorithms for queue randomization
//!
//! Implements the per-fragment permutation (Fisher-Yates), the random
//! fracture offsets that let fragments interleave, and the riffle that
//! places fractures at random anchors in the shuffled order.

use rand::seq::{index, SliceRandom};
use rand::Rng;

/// Random permutation of `live` coordinates
///
/// Returns the permutation (position -> original offset) and the position of
/// `current`. With `protect_current` the current item is swapped to
/// position 0 so it keeps playing uninterrupted.
pub(crate) fn permute<R: Rng + ?Sized>(
    live: &[usize],
    current: Option<usize>,
    protect_current: bool,
    rng: &mut R,
) -> (Vec<usize>, Option<usize>) {
    let mut permutation = live.to_vec();
    permutation.shuffle(rng);

    let position = current.and_then(|offset| permutation.iter().position(|&o| o == offset));
    match position {
        Some(pos) if protect_current => {
            permutation.swap(0, pos);
            (permutation, Some(0))
        }
        _ => (permutation, position),
    }
}

/// Random interior offsets at which a shuffled fragment of `len` items is split
///
/// The count is random too, so small fragments sometimes stay whole and large
/// ones are spread through the queue. Offsets are sorted ascending.
pub(crate) fn fracture_offsets<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
    if len < 2 {
        return Vec::new();
    }

    let max = (len - 1).min(len / 2 + 1);
    let count = rng.gen_range(0..=max);
    let mut offsets: Vec<usize> = index::sample(rng, len - 1, count)
        .into_iter()
        .map(|i| i + 1)
        .collect();
    offsets.sort_unstable();
    offsets
}

/// Insert `pieces` at uniformly random slots of `order`
///
/// The first `anchored` entries of `order` stay in front; everything already
/// in `order` keeps its relative order.
pub(crate) fn riffle<T, R: Rng + ?Sized>(
    mut order: Vec<T>,
    anchored: usize,
    pieces: Vec<T>,
    rng: &mut R,
) -> Vec<T> {
    let anchored = anchored.min(order.len());
    order.reserve(pieces.len());
    for piece in pieces {
        let slot = rng.gen_range(anchored..=order.len());
        order.insert(slot, piece);
    }
    order
}
