//! d-ary min-heap priority queue
//!
//! [`DHeap`] stores `(score, value)` entries in a flat array where every node
//! has up to `d` children. Lower scores pop first; equal scores pop in an
//! unspecified order.
//!
//! # Time Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `push`    | O(log n / log d) |
//! | `pop`     | O(d log n / log d) |
//! | `peek`    | O(1) |
//! | `pop_all_below` | O(m d log n / log d) for m popped entries |
//!
//! Larger `d` makes pushes cheaper and pops more expensive. The default of 4
//! is usually the best trade-off when every pushed entry is eventually popped.
//!
//! # Example
//!
//! ```rust
//! use dheap::DHeap;
//!
//! let mut heap = DHeap::new();
//! heap.push("later", 50).unwrap();
//! heap.push("sooner", 5).unwrap();
//! heap.push("latest", 300).unwrap();
//!
//! assert_eq!(heap.peek(), Some(&"sooner"));
//! assert_eq!(heap.pop_lt(10).unwrap(), Some("sooner"));
//! assert_eq!(heap.pop_lt(10).unwrap(), None);
//! assert_eq!(heap.pop_all_below(100, Vec::<&str>::new()).unwrap(), vec!["later"]);
//! assert_eq!(heap.len(), 1);
//! ```

use std::fmt;
use std::iter::FusedIterator;

use tracing::debug;

use crate::config::HeapConfig;
use crate::error::HeapError;
use crate::order::{Compare, ScoreOrder};
use crate::score::{IntoScore, Score};
use crate::sift::{self, SlotObserver};
use crate::storage::EntryStore;
use crate::traits::PriorityQueue;

/// A d-ary min-heap of `(score, value)` entries
///
/// `S` is the score type and `C` the ordering used to compare scores. The
/// defaults, [`Score`] and [`ScoreOrder`], accept any numeric score through
/// [`IntoScore`]; see [`DHeap::with_comparator`] for other score types.
#[derive(Clone)]
pub struct DHeap<V, S = Score, C = ScoreOrder> {
    d: usize,
    store: EntryStore<S, V>,
    cmp: C,
}

impl<V> DHeap<V> {
    /// Creates an empty heap with the default configuration
    pub fn new() -> Self {
        let config = HeapConfig::default();
        let max_growth = config.max_growth_entries(EntryStore::<Score, V>::entry_size());
        debug!(
            d = config.d,
            capacity = config.capacity,
            max_growth,
            "created d-ary heap"
        );
        Self {
            d: config.d,
            store: empty_store(config.capacity, max_growth),
            cmp: ScoreOrder,
        }
    }

    /// Creates an empty heap with `d` children per node
    pub fn with_d(d: usize) -> Result<Self, HeapError> {
        Self::with_config(HeapConfig::default().with_d(d))
    }

    /// Creates an empty heap from `config`
    pub fn with_config(config: HeapConfig) -> Result<Self, HeapError> {
        Self::with_comparator(config, ScoreOrder)
    }
}

fn empty_store<S, V>(capacity: usize, max_growth: usize) -> EntryStore<S, V> {
    match EntryStore::with_capacity(capacity.min(EntryStore::<S, V>::MAX_ENTRIES), max_growth) {
        Ok(store) => store,
        Err(_) => unreachable!("capacity clamped to MAX_ENTRIES"),
    }
}

impl<V> Default for DHeap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S, C: Compare<S>> DHeap<V, S, C> {
    /// Creates an empty heap ordered by `cmp`
    ///
    /// # Errors
    ///
    /// [`HeapError::Configuration`] if `config` fails validation, or
    /// [`HeapError::CapacityOverflow`] if its capacity is not addressable.
    pub fn with_comparator(config: HeapConfig, cmp: C) -> Result<Self, HeapError> {
        config.validate()?;
        let max_growth = config.max_growth_entries(EntryStore::<S, V>::entry_size());
        let store = EntryStore::with_capacity(config.capacity, max_growth)?;
        debug!(
            d = config.d,
            capacity = config.capacity,
            max_growth,
            "created d-ary heap"
        );
        Ok(Self {
            d: config.d,
            store,
            cmp,
        })
    }

    /// Maximum number of children per node
    #[inline]
    pub fn d(&self) -> usize {
        self.d
    }

    /// Number of entries in the heap
    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if the heap holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Entries the heap can hold before it must grow
    #[inline]
    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    /// The comparator ordering this heap
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Pre-allocates room for `additional` entries using the growth policy
    pub fn reserve(&mut self, additional: usize) -> Result<(), HeapError> {
        self.store.reserve(additional)
    }

    /// Pushes `value` with `score`, returning the slot it settled in
    ///
    /// # Errors
    ///
    /// [`HeapError::Score`] if `score` does not convert, or
    /// [`HeapError::CapacityOverflow`] if the heap cannot grow. The heap is
    /// unchanged in both cases.
    pub fn push(&mut self, value: V, score: impl IntoScore<S>) -> Result<usize, HeapError> {
        let score = score.into_score()?;
        self.push_observed(score, value, &mut ())
    }

    /// Pushes `value` using the value itself as its score
    pub fn push_value(&mut self, value: V) -> Result<usize, HeapError>
    where
        V: Clone + IntoScore<S>,
    {
        let score = value.clone().into_score()?;
        self.push_observed(score, value, &mut ())
    }

    /// The value with the lowest score, without removing it
    #[inline]
    pub fn peek(&self) -> Option<&V> {
        self.store.values().first()
    }

    /// The lowest score in the heap
    #[inline]
    pub fn peek_score(&self) -> Option<&S> {
        self.store.scores().first()
    }

    /// The lowest-scored value together with its score
    #[inline]
    pub fn peek_with_score(&self) -> Option<(&V, &S)> {
        Some((self.peek()?, self.peek_score()?))
    }

    /// Removes and returns the value with the lowest score
    pub fn pop(&mut self) -> Option<V> {
        self.pop_with_score().map(|(value, _)| value)
    }

    /// Removes and returns the lowest-scored value together with its score
    pub fn pop_with_score(&mut self) -> Option<(V, S)> {
        self.pop_observed(&mut ())
    }

    /// Pops the minimum only if its score is strictly below `threshold`
    ///
    /// Returns `Ok(None)` without touching the heap when it is empty or the
    /// minimum is not below `threshold`.
    pub fn pop_lt(&mut self, threshold: impl IntoScore<S>) -> Result<Option<V>, HeapError> {
        let threshold = threshold.into_score()?;
        let popped = self.pop_if(&threshold, false, &mut ());
        Ok(popped.map(|(value, _)| value))
    }

    /// Pops the minimum only if its score is below or equal to `threshold`
    pub fn pop_lte(&mut self, threshold: impl IntoScore<S>) -> Result<Option<V>, HeapError> {
        let threshold = threshold.into_score()?;
        let popped = self.pop_if(&threshold, true, &mut ());
        Ok(popped.map(|(value, _)| value))
    }

    /// Pops every value scored strictly below `threshold` into `receiver`
    ///
    /// Values are appended in pop order, i.e. by non-decreasing score, and
    /// `receiver` is handed back. Anything implementing [`Extend`] works:
    ///
    /// ```rust
    /// use dheap::DHeap;
    ///
    /// let mut heap = DHeap::new();
    /// for (value, score) in [("a", 10), ("b", 20), ("c", 5), ("d", 15), ("e", 1)] {
    ///     heap.push(value, score).unwrap();
    /// }
    /// let due = heap.pop_all_below(16, vec!["already due"]).unwrap();
    /// assert_eq!(due, vec!["already due", "e", "c", "a", "d"]);
    /// assert_eq!(heap.peek(), Some(&"b"));
    /// ```
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
        receiver.extend(DrainBelow {
            heap: self,
            threshold,
        });
        debug!(
            popped = before - self.len(),
            remaining = self.len(),
            "drained heap below threshold"
        );
        Ok(receiver)
    }

    /// Removes every entry, keeping the allocated capacity
    pub fn clear(&mut self) {
        debug!(
            len = self.len(),
            capacity = self.capacity(),
            "clearing heap"
        );
        self.store.clear();
    }

    /// Iterates over `(value, score)` pairs in **storage order**
    ///
    /// Only the first item is guaranteed to be minimal; the rest are in heap
    /// layout, not sorted. Use [`drain_sorted`](Self::drain_sorted) for
    /// sorted output.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&V, &S)> + '_ {
        self.store.values().iter().zip(self.store.scores())
    }

    /// Copies out every `(value, score)` pair in storage order (not sorted)
    pub fn to_vec(&self) -> Vec<(V, S)>
    where
        V: Clone,
        S: Clone,
    {
        self.iter().map(|(v, s)| (v.clone(), s.clone())).collect()
    }

    /// Pops entries lazily, lowest score first
    ///
    /// Entries the iterator has not yielded yet stay in the heap if it is
    /// dropped early.
    pub fn drain_sorted(&mut self) -> DrainSorted<'_, V, S, C> {
        DrainSorted { heap: self }
    }

    /// Visits every live value in storage order
    pub fn for_each_value(&self, f: impl FnMut(&V)) {
        self.store.values().iter().for_each(f);
    }

    /// Visits every live value mutably, e.g. to rewrite relocated handles
    ///
    /// Scores are untouched, so heap order is preserved whatever `f` does.
    pub fn for_each_value_mut(&mut self, f: impl FnMut(&mut V)) {
        self.store.values_mut().iter_mut().for_each(f);
    }

    /// Returns true if every entry's score is no lower than its parent's
    pub fn is_heap(&self) -> bool {
        sift::is_heap(self.store.scores(), &self.cmp, self.d)
    }

    pub(crate) fn store(&self) -> &EntryStore<S, V> {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut EntryStore<S, V> {
        &mut self.store
    }

    pub(crate) fn push_observed<O: SlotObserver<V>>(
        &mut self,
        score: S,
        value: V,
        observer: &mut O,
    ) -> Result<usize, HeapError> {
        self.store.reserve(1)?;
        self.store.push(score, value);
        let slot = self.store.len() - 1;
        observer.slot_written(&self.store.values()[slot], slot);
        let settled = sift::sift_up(&mut self.store, &self.cmp, self.d, slot, observer);
        Ok(settled)
    }

    pub(crate) fn pop_observed<O: SlotObserver<V>>(
        &mut self,
        observer: &mut O,
    ) -> Option<(V, S)> {
        if self.store.is_empty() {
            return None;
        }
        let (score, value) = sift::delete_root(&mut self.store, &self.cmp, self.d, observer);
        Some((value, score))
    }

    pub(crate) fn pop_if<O: SlotObserver<V>>(
        &mut self,
        threshold: &S,
        inclusive: bool,
        observer: &mut O,
    ) -> Option<(V, S)> {
        let root = self.peek_score()?;
        let due = if inclusive {
            self.cmp.le(root, threshold)
        } else {
            self.cmp.lt(root, threshold)
        };
        if due {
            self.pop_observed(observer)
        } else {
            None
        }
    }

    pub(crate) fn update_observed<O: SlotObserver<V>>(
        &mut self,
        slot: usize,
        score: S,
        observer: &mut O,
    ) -> usize {
        sift::update_at(&mut self.store, &self.cmp, self.d, slot, score, observer)
    }

    pub(crate) fn remove_observed<O: SlotObserver<V>>(
        &mut self,
        slot: usize,
        observer: &mut O,
    ) -> (V, S) {
        let (score, value) = sift::remove_at(&mut self.store, &self.cmp, self.d, slot, observer);
        (value, score)
    }
}

impl<V, S, C: Compare<S> + Default> PriorityQueue<V, S> for DHeap<V, S, C> {
    fn with_config(config: HeapConfig) -> Result<Self, HeapError> {
        Self::with_comparator(config, C::default())
    }

    fn d(&self) -> usize {
        self.d
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn push(&mut self, value: V, score: S) -> Result<usize, HeapError> {
        self.push_observed(score, value, &mut ())
    }

    fn peek_with_score(&self) -> Option<(&V, &S)> {
        DHeap::peek_with_score(self)
    }

    fn pop_with_score(&mut self) -> Option<(V, S)> {
        self.pop_observed(&mut ())
    }

    fn pop_lt(&mut self, threshold: &S) -> Option<V> {
        let popped = self.pop_if(threshold, false, &mut ());
        popped.map(|(value, _)| value)
    }

    fn pop_lte(&mut self, threshold: &S) -> Option<V> {
        let popped = self.pop_if(threshold, true, &mut ());
        popped.map(|(value, _)| value)
    }

    fn clear(&mut self) {
        DHeap::clear(self)
    }

    fn is_heap(&self) -> bool {
        DHeap::is_heap(self)
    }
}

impl<V: fmt::Debug, S: fmt::Debug, C> fmt::Debug for DHeap<V, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DHeap")
            .field("d", &self.d)
            .field("len", &self.store.len())
            .field("capacity", &self.store.capacity())
            .field(
                "entries",
                &self
                    .store
                    .values()
                    .iter()
                    .zip(self.store.scores())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Iterator returned by [`DHeap::drain_sorted`]
pub struct DrainSorted<'a, V, S, C> {
    heap: &'a mut DHeap<V, S, C>,
}

impl<V, S, C: Compare<S>> Iterator for DrainSorted<'_, V, S, C> {
    type Item = (V, S);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.heap.pop_with_score()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.heap.len();
        (len, Some(len))
    }
}

impl<V, S, C: Compare<S>> ExactSizeIterator for DrainSorted<'_, V, S, C> {}

impl<V, S, C: Compare<S>> FusedIterator for DrainSorted<'_, V, S, C> {}

/// Pops while the minimum is strictly below a threshold
struct DrainBelow<'a, V, S, C> {
    heap: &'a mut DHeap<V, S, C>,
    threshold: S,
}

impl<V, S, C: Compare<S>> Iterator for DrainBelow<'_, V, S, C> {
    type Item = V;

    #[inline]
    fn next(&mut self) -> Option<V> {
        self.heap
            .pop_if(&self.threshold, false, &mut ())
            .map(|(value, _)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.heap.len()))
    }
}
