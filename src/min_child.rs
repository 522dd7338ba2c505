//! Min-child selection
//!
//! Sift-down spends nearly all of its time asking "which of these (up to `d`)
//! siblings has the smallest score?". Two answers live here:
//!
//! - [`min_index_by`]: the reference linear scan, usable with any comparator.
//! - [`min_index_blocks`]: a branch-light reduction for [`Score`] slices that
//!   folds fixed blocks of eight with a pairwise tree, then carries the best
//!   `(score, index)` across blocks.
//!
//! Both return the **leftmost** index among equal minima. The block version
//! keeps that guarantee because every pairwise step prefers its left operand
//! on ties, and a later block only replaces the carried best on a strict `<`.

use crate::score::Score;

/// Width of one reduction block.
pub const BLOCK: usize = 8;

/// Returns the index of the smallest element of `scores`, leftmost on ties.
///
/// `lt(a, b)` must be a strict weak ordering. `scores` must not be empty.
#[inline]
pub fn min_index_by<S, F>(scores: &[S], mut lt: F) -> usize
where
    F: FnMut(&S, &S) -> bool,
{
    debug_assert!(!scores.is_empty());
    let mut best = 0;
    for (i, score) in scores.iter().enumerate().skip(1) {
        if lt(score, &scores[best]) {
            best = i;
        }
    }
    best
}

#[inline(always)]
fn pick(left: (f64, usize), right: (f64, usize)) -> (f64, usize) {
    if right.0 < left.0 {
        right
    } else {
        left
    }
}

#[inline(always)]
fn reduce_block(block: &[Score], base: usize) -> (f64, usize) {
    let s = |i: usize| (block[i].get(), base + i);
    let a = pick(s(0), s(1));
    let b = pick(s(2), s(3));
    let c = pick(s(4), s(5));
    let d = pick(s(6), s(7));
    pick(pick(a, b), pick(c, d))
}

/// Block-reduction equivalent of [`min_index_by`] for [`Score`] slices.
///
/// Slices shorter than one block go straight to the linear scan.
pub fn min_index_blocks(scores: &[Score]) -> usize {
    debug_assert!(!scores.is_empty());
    if scores.len() < BLOCK {
        return min_index_by(scores, |a, b| a < b);
    }

    let mut blocks = scores.chunks_exact(BLOCK);
    let tail = blocks.remainder();
    let mut best = (f64::INFINITY, 0);
    let mut base = 0;
    for (n, block) in blocks.by_ref().enumerate() {
        let candidate = reduce_block(block, base);
        if n == 0 || candidate.0 < best.0 {
            best = candidate;
        }
        base += BLOCK;
    }
    for (i, score) in tail.iter().enumerate() {
        if score.get() < best.0 {
            best = (score.get(), base + i);
        }
    }
    best.1
}
