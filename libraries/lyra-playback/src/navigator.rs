//! Queue navigation
//!
//! Sequential mode wraps in both directions. Shuffle mode draws uniformly
//! from the whole queue, the current track included, so the same track may
//! come up twice in a row.
//!
//! Track-level repeat is not handled here; the controller restarts the
//! current track itself.

use crate::queue::Queue;
use lyra_core::TrackId;
use rand::Rng;

/// Index after `current` in a queue of `len`, wrapping
pub fn next_index(current: usize, len: usize) -> usize {
    debug_assert!(len > 0);
    (current + 1) % len
}

/// Index before `current` in a queue of `len`, wrapping
pub fn prev_index(current: usize, len: usize) -> usize {
    debug_assert!(len > 0);
    (current + len - 1) % len
}

/// Track to play after the current one.
///
/// Returns `None` for an empty queue. When the current track is not in the
/// queue, sequential mode starts from the first track.
pub fn next<R: Rng + ?Sized>(queue: &Queue, shuffle: bool, rng: &mut R) -> Option<TrackId> {
    if queue.is_empty() {
        return None;
    }
    if shuffle {
        return random(queue, rng);
    }

    let index = match queue.cursor() {
        Some(cursor) => next_index(cursor, queue.len()),
        None => 0,
    };
    queue.get(index)
}

/// Track to play before the current one.
///
/// Returns `None` for an empty queue. When the current track is not in the
/// queue, sequential mode starts from the last track.
pub fn prev<R: Rng + ?Sized>(queue: &Queue, shuffle: bool, rng: &mut R) -> Option<TrackId> {
    if queue.is_empty() {
        return None;
    }
    if shuffle {
        return random(queue, rng);
    }

    let index = match queue.cursor() {
        Some(cursor) => prev_index(cursor, queue.len()),
        None => queue.len() - 1,
    };
    queue.get(index)
}

fn random<R: Rng + ?Sized>(queue: &Queue, rng: &mut R) -> Option<TrackId> {
    queue.get(rng.gen_range(0..queue.len()))
}
