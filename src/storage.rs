//! Entry storage and growth policy
//!
//! Entries live in two parallel vectors, one of scores and one of values, so
//! the min-child scan walks a dense run of scores instead of striding over
//! values it never reads. Slot `i` is the pair `(scores[i], values[i])`; both
//! vectors always have the same length.
//!
//! # Growth
//!
//! Capacity is managed explicitly by [`grow_capacity`] rather than left to
//! `Vec`'s amortized doubling:
//!
//! - the capacity doubles, but one step never adds more than `max_growth`
//!   entries, bounding memory spikes on very large heaps;
//! - the result is clamped to the largest addressable entry count, and a
//!   request beyond that is a [`HeapError::CapacityOverflow`];
//! - a step never yields less than what the caller asked for.
//!
//! Growth moves the existing entries wholesale; nothing outside the store may
//! hold a reference into it across a push. Capacity is never given back
//! automatically, so a drained-and-refilled heap reuses its allocation.

use std::mem::size_of;

use tracing::debug;

use crate::error::HeapError;

/// Computes the capacity needed to hold `additional` more entries.
///
/// Returns `capacity` unchanged if it already suffices.
///
/// # Errors
///
/// [`HeapError::CapacityOverflow`] if `len + additional` exceeds `max_entries`.
pub fn grow_capacity(
    capacity: usize,
    len: usize,
    additional: usize,
    max_growth: usize,
    max_entries: usize,
) -> Result<usize, HeapError> {
    let required = len
        .checked_add(additional)
        .filter(|&required| required <= max_entries)
        .ok_or(HeapError::CapacityOverflow {
            requested: len.saturating_add(additional),
            max: max_entries,
        })?;
    if required <= capacity {
        return Ok(capacity);
    }
    let step = capacity.max(1).min(max_growth.max(1));
    let grown = capacity.saturating_add(step).min(max_entries);
    Ok(grown.max(required))
}

/// Contiguous `(score, value)` storage with an explicit growth policy
#[derive(Debug, Clone)]
pub struct EntryStore<S, V> {
    scores: Vec<S>,
    values: Vec<V>,
    max_growth: usize,
}

impl<S, V> EntryStore<S, V> {
    /// Largest number of entries whose storage stays below `isize::MAX` bytes
    pub const MAX_ENTRIES: usize = isize::MAX as usize / Self::ENTRY_SIZE_NONZERO;

    const ENTRY_SIZE_NONZERO: usize = if size_of::<S>() + size_of::<V>() == 0 {
        1
    } else {
        size_of::<S>() + size_of::<V>()
    };

    /// Bytes used by one entry
    pub const fn entry_size() -> usize {
        size_of::<S>() + size_of::<V>()
    }

    /// Creates an empty store holding at least `capacity` entries
    pub fn with_capacity(capacity: usize, max_growth: usize) -> Result<Self, HeapError> {
        if capacity > Self::MAX_ENTRIES {
            return Err(HeapError::CapacityOverflow {
                requested: capacity,
                max: Self::MAX_ENTRIES,
            });
        }
        Ok(Self {
            scores: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            max_growth,
        })
    }

    /// Number of live entries
    #[inline]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns true if there are no live entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Entries that fit without reallocating
    #[inline]
    pub fn capacity(&self) -> usize {
        self.scores.capacity().min(self.values.capacity())
    }

    /// Largest number of entries a single growth step adds
    pub fn max_growth(&self) -> usize {
        self.max_growth
    }

    /// Makes room for `additional` more entries according to [`grow_capacity`]
    pub fn reserve(&mut self, additional: usize) -> Result<(), HeapError> {
        let capacity = self.capacity();
        let target = grow_capacity(
            capacity,
            self.len(),
            additional,
            self.max_growth,
            Self::MAX_ENTRIES,
        )?;
        if target > capacity {
            debug!(
                from = capacity,
                to = target,
                len = self.len(),
                "growing heap storage"
            );
            let len = self.len();
            self.scores.reserve_exact(target - len);
            self.values.reserve_exact(target - len);
        }
        Ok(())
    }

    /// Appends an entry; the caller must have reserved room for it
    #[inline]
    pub(crate) fn push(&mut self, score: S, value: V) {
        debug_assert!(self.len() < self.capacity());
        self.scores.push(score);
        self.values.push(value);
    }

    /// Removes slot `index`, filling it with the last entry
    #[inline]
    pub(crate) fn swap_remove(&mut self, index: usize) -> (S, V) {
        let score = self.scores.swap_remove(index);
        (score, self.values.swap_remove(index))
    }

    /// Drops every entry, keeping the allocation
    pub fn clear(&mut self) {
        self.scores.clear();
        self.values.clear();
    }

    /// All live scores, in slot order
    #[inline]
    pub fn scores(&self) -> &[S] {
        &self.scores
    }

    /// All live values, in slot order
    #[inline]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    #[inline]
    pub(crate) fn values_mut(&mut self) -> &mut [V] {
        &mut self.values
    }

    #[inline]
    pub(crate) fn score_mut(&mut self, index: usize) -> &mut S {
        &mut self.scores[index]
    }

    #[inline]
    pub(crate) fn slices_mut(&mut self) -> (&mut [S], &mut [V]) {
        (&mut self.scores, &mut self.values)
    }

    /// Replaces every value at once; `values` must have `len()` elements
    pub(crate) fn replace_values(&mut self, values: Vec<V>) {
        debug_assert_eq!(values.len(), self.scores.len());
        self.values = values;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grow_doubles() {
        assert_eq!(grow_capacity(32, 32, 1, 1 << 20, usize::MAX), Ok(64));
        assert_eq!(grow_capacity(64, 64, 1, 1 << 20, usize::MAX), Ok(128));
    }

    #[test]
    fn test_grow_noop_when_room() {
        assert_eq!(grow_capacity(32, 10, 1, 8, usize::MAX), Ok(32));
        assert_eq!(grow_capacity(32, 31, 1, 8, usize::MAX), Ok(32));
    }

    #[test]
    fn test_grow_step_is_capped() {
        assert_eq!(grow_capacity(1000, 1000, 1, 100, usize::MAX), Ok(1100));
    }

    #[test]
    fn test_grow_never_less_than_required() {
        assert_eq!(grow_capacity(8, 8, 50, 4, usize::MAX), Ok(58));
        assert_eq!(grow_capacity(0, 0, 1, 4, usize::MAX), Ok(1));
    }

    #[test]
    fn test_grow_clamps_to_max() {
        assert_eq!(grow_capacity(60, 60, 1, 1000, 100), Ok(100));
        assert_eq!(grow_capacity(100, 99, 1, 1000, 100), Ok(100));
    }

    #[test]
    fn test_grow_overflow() {
        assert_eq!(
            grow_capacity(100, 100, 1, 1000, 100),
            Err(HeapError::CapacityOverflow {
                requested: 101,
                max: 100
            })
        );
        assert_eq!(
            grow_capacity(0, usize::MAX, 1, 1, usize::MAX),
            Err(HeapError::CapacityOverflow {
                requested: usize::MAX,
                max: usize::MAX
            })
        );
    }

    #[test]
    fn test_store_reserve_and_clear() {
        let mut store: EntryStore<u64, u64> = EntryStore::with_capacity(2, 1 << 20).unwrap();
        for i in 0..10 {
            store.reserve(1).unwrap();
            store.push(i, i * 10);
        }
        assert_eq!(store.len(), 10);
        assert_eq!(store.scores(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        assert_eq!(store.values()[9], 90);

        let capacity = store.capacity();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.capacity(), capacity);
    }

    #[test]
    fn test_store_swap_remove() {
        let mut store: EntryStore<u8, char> = EntryStore::with_capacity(4, 4).unwrap();
        for (s, v) in [(1, 'a'), (2, 'b'), (3, 'c')] {
            store.push(s, v);
        }
        assert_eq!(store.swap_remove(0), (1, 'a'));
        assert_eq!(store.scores(), &[3, 2]);
        assert_eq!(store.values(), &['c', 'b']);
    }

    #[test]
    fn test_store_rejects_oversized_capacity() {
        let result: Result<EntryStore<u64, u64>, _> = EntryStore::with_capacity(usize::MAX, 1);
        assert!(matches!(result, Err(HeapError::CapacityOverflow { .. })));
    }
}
