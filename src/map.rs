//! d-ary heap with a value index
//!
//! [`DHeapMap`] keeps each value at most once and remembers the slot it
//! occupies, so a value's score can be read in O(1) and changed in
//! O(log n / log d) instead of pushing a duplicate.
//!
//! The index is kept in step with the heap by the sift routines themselves:
//! every slot they write is reported to the index as part of the same step,
//! so no sift logic is duplicated between the two heap types.
//!
//! # Example
//!
//! ```rust
//! use dheap::DHeapMap;
//!
//! let mut timers = DHeapMap::new();
//! timers.push("flush", 30).unwrap();
//! timers.push("heartbeat", 10).unwrap();
//!
//! // pushing a value that is already present reschedules it
//! timers.push("flush", 5).unwrap();
//! assert_eq!(timers.len(), 2);
//! assert_eq!(timers.score_of("flush").map(|s| s.get()), Some(5.0));
//!
//! assert_eq!(timers.remove("heartbeat").map(|s| s.get()), Some(10.0));
//! assert_eq!(timers.pop(), Some("flush"));
//! assert!(timers.is_empty());
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::config::{HeapConfig, DEFAULT_CAPACITY};
use crate::dheap::DHeap;
use crate::error::HeapError;
use crate::order::{Compare, ScoreOrder};
use crate::score::{IntoScore, Score};
use crate::sift::SlotObserver;
use crate::traits::{IndexedPriorityQueue, PriorityQueue};

/// Value to slot lookup, updated on every slot write
type SlotIndex<V> = FxHashMap<V, usize>;

impl<V: Hash + Eq> SlotObserver<V> for SlotIndex<V> {
    #[inline]
    fn slot_written(&mut self, value: &V, slot: usize) {
        if let Some(entry) = self.get_mut(value) {
            *entry = slot;
        }
    }
}

/// A d-ary min-heap where every value is unique and can be rescored
///
/// `V` is the identity of an entry: two values that compare equal are the
/// same entry. Values are cloned once when first inserted, to key the index.
#[derive(Clone)]
pub struct DHeapMap<V, S = Score, C = ScoreOrder>
where
    V: Hash + Eq + Clone,
{
    heap: DHeap<V, S, C>,
    index: SlotIndex<V>,
}

impl<V: Hash + Eq + Clone> DHeapMap<V> {
    /// Creates an empty map-heap with the default configuration
    pub fn new() -> Self {
        Self {
            heap: DHeap::new(),
            index: FxHashMap::with_capacity_and_hasher(DEFAULT_CAPACITY, Default::default()),
        }
    }

    /// Creates an empty map-heap with `d` children per node
    pub fn with_d(d: usize) -> Result<Self, HeapError> {
        Self::with_config(HeapConfig::default().with_d(d))
    }

    /// Creates an empty map-heap from `config`
    pub fn with_config(config: HeapConfig) -> Result<Self, HeapError> {
        Self::with_comparator(config, ScoreOrder)
    }
}

impl<V: Hash + Eq + Clone> Default for DHeapMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S, C> DHeapMap<V, S, C>
where
    V: Hash + Eq + Clone,
    C: Compare<S>,
{
    /// Creates an empty map-heap ordered by `cmp`
    pub fn with_comparator(config: HeapConfig, cmp: C) -> Result<Self, HeapError> {
        let heap = DHeap::with_comparator(config, cmp)?;
        Ok(Self {
            heap,
            index: FxHashMap::with_capacity_and_hasher(config.capacity, Default::default()),
        })
    }

    /// Maximum number of children per node
    #[inline]
    pub fn d(&self) -> usize {
        self.heap.d()
    }

    /// Number of values in the heap
    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if the heap holds no values
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Entries the heap can hold before it must grow
    #[inline]
    pub fn capacity(&self) -> usize {
        self.heap.capacity()
    }

    /// Pre-allocates room for `additional` values
    pub fn reserve(&mut self, additional: usize) -> Result<(), HeapError> {
        self.heap.reserve(additional)?;
        self.index.reserve(additional);
        Ok(())
    }

    /// Inserts `value` with `score`, or rescores it if already present
    ///
    /// Returns the slot the value settled in. A rescore moves the entry
    /// toward the leaves if its score grew, and toward the root otherwise.
    /// Either way the stored value, and the index key, become `value`.
    pub fn push(&mut self, value: V, score: impl IntoScore<S>) -> Result<usize, HeapError> {
        let score = score.into_score()?;
        // the index keeps its old key on insert, so swap the key out too
        if let Some(slot) = self.index.remove(&value) {
            self.heap.store_mut().values_mut()[slot] = value.clone();
            self.index.insert(value, slot);
            return Ok(self.rescore(slot, score));
        }
        self.heap.reserve(1)?;
        self.index.insert(value.clone(), self.heap.len());
        let slot = self.heap.push_observed(score, value, &mut self.index)?;
        trace!(slot, len = self.len(), "inserted entry");
        Ok(slot)
    }

    /// Same as [`push`](Self::push)
    #[inline]
    pub fn upsert(&mut self, value: V, score: impl IntoScore<S>) -> Result<usize, HeapError> {
        self.push(value, score)
    }

    /// Inserts or rescores `value` using the value itself as its score
    pub fn push_value(&mut self, value: V) -> Result<usize, HeapError>
    where
        V: IntoScore<S>,
    {
        let score = value.clone().into_score()?;
        self.push(value, score)
    }

    fn rescore(&mut self, slot: usize, score: S) -> usize {
        let moved = self.heap.update_observed(slot, score, &mut self.index);
        if moved > slot {
            trace!(from = slot, to = moved, "rescored entry, sifted down");
        } else if moved < slot {
            trace!(from = slot, to = moved, "rescored entry, sifted up");
        } else {
            trace!(slot, "rescored entry in place");
        }
        moved
    }

    /// Returns true if `value` is in the heap
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(value)
    }

    /// The current score of `value`
    pub fn score_of<Q>(&self, value: &Q) -> Option<&S>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let &slot = self.index.get(value)?;
        self.heap.store().scores().get(slot)
    }

    /// Removes `value`, returning the score it had
    pub fn remove<Q>(&mut self, value: &Q) -> Option<S>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.index.remove(value)?;
        let (_, score) = self.heap.remove_observed(slot, &mut self.index);
        trace!(slot, len = self.len(), "removed entry");
        Some(score)
    }

    /// The value with the lowest score, without removing it
    #[inline]
    pub fn peek(&self) -> Option<&V> {
        self.heap.peek()
    }

    /// The lowest score in the heap
    #[inline]
    pub fn peek_score(&self) -> Option<&S> {
        self.heap.peek_score()
    }

    /// The lowest-scored value together with its score
    #[inline]
    pub fn peek_with_score(&self) -> Option<(&V, &S)> {
        self.heap.peek_with_score()
    }

    /// Removes and returns the value with the lowest score
    pub fn pop(&mut self) -> Option<V> {
        self.pop_with_score().map(|(value, _)| value)
    }

    /// Removes and returns the lowest-scored value together with its score
    pub fn pop_with_score(&mut self) -> Option<(V, S)> {
        let popped = self.heap.pop_observed(&mut self.index)?;
        self.forget(popped)
    }

    /// Pops the minimum only if its score is strictly below `threshold`
    pub fn pop_lt(&mut self, threshold: impl IntoScore<S>) -> Result<Option<V>, HeapError> {
        let threshold = threshold.into_score()?;
        Ok(self.pop_if(&threshold, false).map(|(value, _)| value))
    }

    /// Pops the minimum only if its score is below or equal to `threshold`
    pub fn pop_lte(&mut self, threshold: impl IntoScore<S>) -> Result<Option<V>, HeapError> {
        let threshold = threshold.into_score()?;
        Ok(self.pop_if(&threshold, true).map(|(value, _)| value))
    }

    /// Pops every value scored strictly below `threshold` into `receiver`,
    /// lowest score first, and hands `receiver` back
    pub fn pop_all_below<E>(
        &mut self,
        threshold: impl IntoScore<S>,
        mut receiver: E,
    ) -> Result<E, HeapError>
    where
        E: Extend<V>,
    {
        let threshold = threshold.into_score()?;
        let before = self.len();
        receiver.extend(std::iter::from_fn(|| {
            self.pop_if(&threshold, false).map(|(value, _)| value)
        }));
        debug!(
            popped = before - self.len(),
            remaining = self.len(),
            "drained map below threshold"
        );
        Ok(receiver)
    }

    pub(crate) fn pop_if(&mut self, threshold: &S, inclusive: bool) -> Option<(V, S)> {
        let popped = self.heap.pop_if(threshold, inclusive, &mut self.index)?;
        self.forget(popped)
    }

    #[inline]
    fn forget(&mut self, (value, score): (V, S)) -> Option<(V, S)> {
        self.index.remove(&value);
        Some((value, score))
    }

    /// Removes every value, keeping the allocated capacity
    pub fn clear(&mut self) {
        self.heap.clear();
        self.index.clear();
    }

    /// Iterates over `(value, score)` pairs in storage order (not sorted)
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&V, &S)> + '_ {
        self.heap.iter()
    }

    /// Copies out every `(value, score)` pair in storage order (not sorted)
    pub fn to_vec(&self) -> Vec<(V, S)>
    where
        S: Clone,
    {
        self.heap.to_vec()
    }

    /// Pops values lazily, lowest score first
    ///
    /// Values not yet yielded stay in the heap if the iterator is dropped.
    pub fn drain_sorted(&mut self) -> DrainSorted<'_, V, S, C> {
        DrainSorted { map: self }
    }

    /// Visits every live value in storage order
    pub fn for_each_value(&self, f: impl FnMut(&V)) {
        self.heap.for_each_value(f);
    }

    /// Replaces every value with `f(value)` and rebuilds the index
    ///
    /// Scores and slots are unchanged. If two new values collide, the heap
    /// is left exactly as it was.
    ///
    /// # Errors
    ///
    /// [`HeapError::DuplicateValue`] if `f` maps two live values to equal
    /// values.
    pub fn relocate_values(&mut self, f: impl FnMut(&V) -> V) -> Result<(), HeapError> {
        let values: Vec<V> = self.heap.store().values().iter().map(f).collect();
        let mut index =
            FxHashMap::with_capacity_and_hasher(self.index.capacity(), Default::default());
        for (slot, value) in values.iter().enumerate() {
            if index.insert(value.clone(), slot).is_some() {
                return Err(HeapError::DuplicateValue);
            }
        }
        self.heap.store_mut().replace_values(values);
        self.index = index;
        Ok(())
    }

    /// Returns true if every entry's score is no lower than its parent's
    pub fn is_heap(&self) -> bool {
        self.heap.is_heap()
    }

    /// Returns true if the index maps exactly the live values to their slots
    pub fn is_consistent(&self) -> bool {
        let values = self.heap.store().values();
        self.index.len() == values.len()
            && values
                .iter()
                .enumerate()
                .all(|(slot, value)| self.index.get(value) == Some(&slot))
    }
}

impl<V, S, C> PriorityQueue<V, S> for DHeapMap<V, S, C>
where
    V: Hash + Eq + Clone,
    C: Compare<S> + Default,
{
    fn with_config(config: HeapConfig) -> Result<Self, HeapError> {
        Self::with_comparator(config, C::default())
    }

    fn d(&self) -> usize {
        self.heap.d()
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn push(&mut self, value: V, score: S) -> Result<usize, HeapError> {
        DHeapMap::push(self, value, score)
    }

    fn peek_with_score(&self) -> Option<(&V, &S)> {
        self.heap.peek_with_score()
    }

    fn pop_with_score(&mut self) -> Option<(V, S)> {
        DHeapMap::pop_with_score(self)
    }

    fn pop_lt(&mut self, threshold: &S) -> Option<V> {
        self.pop_if(threshold, false).map(|(value, _)| value)
    }

    fn pop_lte(&mut self, threshold: &S) -> Option<V> {
        self.pop_if(threshold, true).map(|(value, _)| value)
    }

    fn clear(&mut self) {
        DHeapMap::clear(self)
    }

    fn is_heap(&self) -> bool {
        self.heap.is_heap()
    }
}

impl<V, S, C> IndexedPriorityQueue<V, S> for DHeapMap<V, S, C>
where
    V: Hash + Eq + Clone,
    C: Compare<S> + Default,
{
    fn contains(&self, value: &V) -> bool {
        self.index.contains_key(value)
    }

    fn score_of(&self, value: &V) -> Option<&S> {
        DHeapMap::score_of(self, value)
    }

    fn remove(&mut self, value: &V) -> Option<S> {
        DHeapMap::remove(self, value)
    }

    fn is_consistent(&self) -> bool {
        DHeapMap::is_consistent(self)
    }
}

impl<V, S, C> fmt::Debug for DHeapMap<V, S, C>
where
    V: Hash + Eq + Clone + fmt::Debug,
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DHeapMap")
            .field("heap", &self.heap)
            .finish()
    }
}

/// Iterator returned by [`DHeapMap::drain_sorted`]
pub struct DrainSorted<'a, V, S, C>
where
    V: Hash + Eq + Clone,
{
    map: &'a mut DHeapMap<V, S, C>,
}

impl<V, S, C> Iterator for DrainSorted<'_, V, S, C>
where
    V: Hash + Eq + Clone,
    C: Compare<S>,
{
    type Item = (V, S);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.map.pop_with_score()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.map.len();
        (len, Some(len))
    }
}

impl<V, S, C> ExactSizeIterator for DrainSorted<'_, V, S, C>
where
    V: Hash + Eq + Clone,
    C: Compare<S>,
{
}

impl<V, S, C> FusedIterator for DrainSorted<'_, V, S, C>
where
    V: Hash + Eq + Clone,
    C: Compare<S>,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Natural;

    fn score_of(map: &DHeapMap<&'static str>, value: &str) -> Option<f64> {
        map.score_of(value).map(|s| s.get())
    }

    fn filled(d: usize) -> DHeapMap<&'static str> {
        let mut map = DHeapMap::with_d(d).unwrap();
        for (value, score) in [("a", 50), ("b", 40), ("c", 30), ("d", 20), ("e", 10)] {
            map.push(value, score).unwrap();
        }
        map
    }

    #[test]
    fn test_push_new_values() {
        let map = filled(2);
        assert_eq!(map.len(), 5);
        assert_eq!(map.peek(), Some(&"e"));
        assert_eq!(score_of(&map, "c"), Some(30.0));
        assert_eq!(score_of(&map, "z"), None);
        assert!(map.contains("a"));
        assert!(!map.contains("z"));
        assert!(map.is_consistent());
        assert!(map.is_heap());
    }

    #[test]
    fn test_rescore_down_and_up() {
        let mut map = filled(2);
        map.push("e", 100).unwrap();
        assert_eq!(map.len(), 5);
        assert_eq!(map.peek(), Some(&"d"));
        assert_eq!(score_of(&map, "e"), Some(100.0));
        assert!(map.is_consistent());

        map.upsert("a", -1).unwrap();
        assert_eq!(map.peek(), Some(&"a"));
        assert!(map.is_consistent());
        assert!(map.is_heap());

        let order: Vec<&str> = map.drain_sorted().map(|(v, _)| v).collect();
        assert_eq!(order, vec!["a", "d", "c", "b", "e"]);
    }

    /// Equal by `id` only, so a rescore can carry a different payload
    #[derive(Debug, Clone)]
    struct Task {
        id: u32,
        payload: &'static str,
    }

    impl PartialEq for Task {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }

    impl Eq for Task {}

    impl Hash for Task {
        fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    fn task(id: u32, payload: &'static str) -> Task {
        Task { id, payload }
    }

    #[test]
    fn test_rescore_replaces_value() {
        let mut map: DHeapMap<Task> = DHeapMap::with_d(2).unwrap();
        map.push(task(1, "old"), 10).unwrap();
        map.push(task(2, "other"), 7).unwrap();
        map.push(task(3, "later"), 20).unwrap();

        // moves toward the root
        map.push(task(1, "new"), 5).unwrap();
        assert_eq!(map.len(), 3);
        assert!(map.is_consistent());
        let (key, _) = map.index.get_key_value(&task(1, "")).unwrap();
        assert_eq!(key.payload, "new");

        // stays in place
        map.push(task(3, "same score"), 20).unwrap();
        // moves toward the leaves
        map.push(task(2, "pushed back"), 30).unwrap();
        assert!(map.is_heap());
        assert!(map.is_consistent());

        let order: Vec<(u32, &str)> = map.drain_sorted().map(|(t, _)| (t.id, t.payload)).collect();
        assert_eq!(
            order,
            vec![(1, "new"), (3, "same score"), (2, "pushed back")]
        );
    }

    #[test]
    fn test_rescore_nan_keeps_old_value() {
        let mut map: DHeapMap<Task> = DHeapMap::new();
        map.push(task(1, "old"), 10).unwrap();
        assert!(map.push(task(1, "new"), f64::NAN).is_err());
        assert_eq!(map.peek().map(|t| t.payload), Some("old"));
        assert!(map.is_consistent());
    }

    #[test]
    fn test_drain_sorted_is_exact_size() {
        let mut map = filled(3);
        let mut drain = map.drain_sorted();
        assert_eq!(drain.len(), 5);
        assert_eq!(drain.next().map(|(v, _)| v), Some("e"));
        assert_eq!(drain.len(), 4);
        drop(drain);
        assert_eq!(map.len(), 4);
        assert!(!map.contains("e"));
        assert!(map.is_consistent());

        let mut drain = map.drain_sorted();
        assert_eq!(drain.by_ref().count(), 4);
        assert_eq!(drain.next(), None);
        assert_eq!(drain.next(), None);
    }

    #[test]
    fn test_rescore_same_score_stays() {
        let mut map = filled(4);
        let slot = map.iter().position(|(v, _)| *v == "c").unwrap();
        assert_eq!(map.push("c", 30).unwrap(), slot);
        assert!(map.is_consistent());
    }

    #[test]
    fn test_pop_forgets_value() {
        let mut map = filled(3);
        assert_eq!(
            map.pop_with_score().map(|(v, s)| (v, s.get())),
            Some(("e", 10.0))
        );
        assert!(!map.contains("e"));
        assert_eq!(score_of(&map, "e"), None);
        assert!(map.is_consistent());

        map.push("e", 1).unwrap();
        assert_eq!(map.len(), 5);
        assert_eq!(map.peek(), Some(&"e"));
    }

    #[test]
    fn test_remove() {
        let mut map = filled(2);
        assert_eq!(map.remove("c").map(|s| s.get()), Some(30.0));
        assert_eq!(map.remove("c"), None);
        assert_eq!(map.len(), 4);
        assert!(map.is_consistent());
        assert!(map.is_heap());

        // the root, and the tail slot
        let root = *map.peek().unwrap();
        map.remove(root).unwrap();
        let (tail, _) = map.iter().last().map(|(v, s)| (*v, *s)).unwrap();
        map.remove(tail).unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.is_consistent());
        assert!(map.is_heap());
    }

    #[test]
    fn test_remove_tail_filler_moves_up() {
        let mut map: DHeapMap<u32> = DHeapMap::with_d(2).unwrap();
        for (v, s) in [(0, 0), (1, 10), (2, 1), (3, 11), (4, 12), (5, 2), (6, 3)] {
            map.push(v, s).unwrap();
        }
        map.remove(&4).unwrap();
        assert!(map.is_heap());
        assert!(map.is_consistent());
        assert_eq!(map.score_of(&6).map(|s| s.get()), Some(3.0));
    }

    #[test]
    fn test_conditional_pops() {
        let mut map = filled(4);
        assert_eq!(map.pop_lt(10).unwrap(), None);
        assert_eq!(map.pop_lte(10).unwrap(), Some("e"));
        let below = map.pop_all_below(45, Vec::<&str>::new()).unwrap();
        assert_eq!(below, vec!["d", "c", "b"]);
        assert_eq!(map.len(), 1);
        assert!(map.is_consistent());
        assert!(matches!(map.pop_lt(f64::NAN), Err(HeapError::Score(_))));
    }

    #[test]
    fn test_clear() {
        let mut map = filled(2);
        map.clear();
        assert!(map.is_empty());
        assert!(!map.contains("a"));
        assert!(map.is_consistent());
    }

    #[test]
    fn test_relocate_values() {
        let mut map: DHeapMap<String> = DHeapMap::new();
        map.push("x".to_string(), 2).unwrap();
        map.push("y".to_string(), 1).unwrap();

        map.relocate_values(|v| v.to_uppercase()).unwrap();
        assert!(map.contains("X"));
        assert!(!map.contains("x"));
        assert_eq!(map.peek().map(String::as_str), Some("Y"));
        assert!(map.is_consistent());

        let before = map.to_vec();
        assert_eq!(
            map.relocate_values(|_| "same".to_string()),
            Err(HeapError::DuplicateValue)
        );
        assert_eq!(map.to_vec(), before);
        assert!(map.is_consistent());
    }

    #[test]
    fn test_natural_scores() {
        let mut map: DHeapMap<char, u64, Natural> =
            DHeapMap::with_comparator(HeapConfig::default(), Natural).unwrap();
        map.push('a', 3u64).unwrap();
        map.push('b', 1u64).unwrap();
        map.push('a', 0u64).unwrap();
        assert_eq!(map.score_of(&'a'), Some(&0));
        assert_eq!(map.pop_with_score(), Some(('a', 0)));
        assert_eq!(map.pop_with_score(), Some(('b', 1)));
    }
}
