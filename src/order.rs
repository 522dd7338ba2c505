//! Score ordering strategies
//!
//! A heap is parameterized by a comparator chosen at construction time rather
//! than by inspecting score types at runtime:
//!
//! - [`ScoreOrder`]: the fast path for [`Score`]. With the `block-min` feature
//!   (on by default) its min-child scan is [`min_index_blocks`].
//! - [`Natural`]: ascending order for any `S: Ord`.
//! - [`FnOrder`]: an injected `Fn(&S, &S) -> Ordering`.
//!
//! Every comparator must describe a strict weak ordering; the heap never
//! checks this, it just produces a meaningless order when it doesn't hold.
//!
//! # Example
//!
//! ```rust
//! use dheap::{DHeap, FnOrder, HeapConfig};
//!
//! // a max-heap over u32 scores
//! let mut heap: DHeap<&str, u32, _> = DHeap::with_comparator(
//!     HeapConfig::default(),
//!     FnOrder(|a: &u32, b: &u32| b.cmp(a)),
//! )
//! .unwrap();
//! heap.push("low", 1).unwrap();
//! heap.push("high", 9).unwrap();
//! assert_eq!(heap.pop(), Some("high"));
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::min_child::min_index_by;
use crate::score::Score;

/// Ordering used by a heap to compare scores
pub trait Compare<S> {
    /// Returns true if `a` must be popped before `b`
    fn lt(&self, a: &S, b: &S) -> bool;

    /// Returns true if `a` may be popped before or together with `b`
    #[inline]
    fn le(&self, a: &S, b: &S) -> bool {
        !self.lt(b, a)
    }

    /// Index of the first minimal score in a non-empty slice
    ///
    /// Overrides must match the leftmost-tie result of the default scan.
    #[inline]
    fn min_index(&self, scores: &[S]) -> usize {
        min_index_by(scores, |a, b| self.lt(a, b))
    }
}

/// Ascending order on [`Score`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreOrder;

impl Compare<Score> for ScoreOrder {
    #[inline]
    fn lt(&self, a: &Score, b: &Score) -> bool {
        a < b
    }

    #[inline]
    fn le(&self, a: &Score, b: &Score) -> bool {
        a <= b
    }

    #[cfg(feature = "block-min")]
    #[inline]
    fn min_index(&self, scores: &[Score]) -> usize {
        crate::min_child::min_index_blocks(scores)
    }
}

/// Ascending order on any `Ord` score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Natural;

impl<S: Ord> Compare<S> for Natural {
    #[inline]
    fn lt(&self, a: &S, b: &S) -> bool {
        a < b
    }

    #[inline]
    fn le(&self, a: &S, b: &S) -> bool {
        a <= b
    }
}

/// Order defined by a caller-supplied comparison function
///
/// Scores comparing as [`Ordering::Less`] are popped first.
#[derive(Clone, Copy)]
pub struct FnOrder<F>(pub F);

impl<S, F> Compare<S> for FnOrder<F>
where
    F: Fn(&S, &S) -> Ordering,
{
    #[inline]
    fn lt(&self, a: &S, b: &S) -> bool {
        (self.0)(a, b) == Ordering::Less
    }

    #[inline]
    fn le(&self, a: &S, b: &S) -> bool {
        (self.0)(a, b) != Ordering::Greater
    }
}

impl<F> fmt::Debug for FnOrder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnOrder(..)")
    }
}
