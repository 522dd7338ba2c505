//! Common traits for the heap types
//!
//! This module provides a two-tier trait hierarchy:
//!
//! - [`PriorityQueue`]: push, peek, and (conditional) pop over `(value, score)`
//!   entries
//! - [`IndexedPriorityQueue`]: adds lookup, rescoring, and removal by value
//!
//! Both [`DHeap`](crate::DHeap) and [`DHeapMap`](crate::DHeapMap) implement
//! [`PriorityQueue`]; only the map variant is indexed. The traits take scores
//! already in the heap's score type, so code written against them works for
//! any comparator.

use crate::config::HeapConfig;
use crate::error::HeapError;

/// Base trait for d-ary min-heaps
///
/// # Example
///
/// ```rust
/// use dheap::{DHeap, HeapConfig, PriorityQueue, Score};
///
/// fn drain<Q: PriorityQueue<&'static str, Score>>(queue: &mut Q) -> Vec<&'static str> {
///     std::iter::from_fn(|| queue.pop_with_score().map(|(v, _)| v)).collect()
/// }
///
/// let mut heap: DHeap<&str> = PriorityQueue::with_config(HeapConfig::default()).unwrap();
/// heap.push("two", Score::new(2.0).unwrap()).unwrap();
/// heap.push("one", Score::new(1.0).unwrap()).unwrap();
/// assert_eq!(drain(&mut heap), vec!["one", "two"]);
/// ```
pub trait PriorityQueue<V, S> {
    /// Creates an empty heap from `config`
    fn with_config(config: HeapConfig) -> Result<Self, HeapError>
    where
        Self: Sized;

    /// Maximum number of children per node
    fn d(&self) -> usize;

    /// Returns the number of entries
    fn len(&self) -> usize;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts `value` with `score`, returning the slot it settled in
    ///
    /// Indexed heaps rescore `value` instead if it is already present.
    ///
    /// # Time Complexity
    /// O(log n / log d)
    fn push(&mut self, value: V, score: S) -> Result<usize, HeapError>;

    /// Returns the minimum entry without removing it
    ///
    /// # Time Complexity
    /// O(1)
    fn peek_with_score(&self) -> Option<(&V, &S)>;

    /// Removes and returns the minimum entry
    ///
    /// # Time Complexity
    /// O(d log n / log d)
    fn pop_with_score(&mut self) -> Option<(V, S)>;

    /// Pops the minimum only if its score is strictly below `threshold`
    fn pop_lt(&mut self, threshold: &S) -> Option<V>;

    /// Pops the minimum only if its score is below or equal to `threshold`
    fn pop_lte(&mut self, threshold: &S) -> Option<V>;

    /// Removes every entry
    fn clear(&mut self);

    /// Returns true if no entry is smaller than its parent
    fn is_heap(&self) -> bool;
}

/// Heaps that track where each value lives
///
/// Values are unique: [`PriorityQueue::push`] on a value already present
/// replaces its score and moves it in whichever direction the new score
/// requires.
pub trait IndexedPriorityQueue<V, S>: PriorityQueue<V, S> {
    /// Returns true if `value` is in the heap
    ///
    /// # Time Complexity
    /// O(1) expected
    fn contains(&self, value: &V) -> bool;

    /// Current score of `value`
    ///
    /// # Time Complexity
    /// O(1) expected
    fn score_of(&self, value: &V) -> Option<&S>;

    /// Removes `value`, returning its score
    ///
    /// # Time Complexity
    /// O(d log n / log d)
    fn remove(&mut self, value: &V) -> Option<S>;

    /// Returns true if the value index agrees with the heap slots
    fn is_consistent(&self) -> bool;
}
