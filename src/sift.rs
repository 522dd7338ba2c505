//! Heap-order restoration
//!
//! Index arithmetic for a d-ary heap stored in slot order:
//!
//! - `parent(i) = (i - 1) / d`
//! - children of `i` are `i*d + 1 ..= i*d + d`, clipped to the last slot
//!
//! Both sifts use a hole: the entry being moved is read out once, the entries
//! along its path shift by one level each, and the held entry is written once
//! into its final slot. No pairwise swaps.
//!
//! # Slot observers
//!
//! The indexed map variant has to know where every value lives. Rather than
//! duplicate the sift logic, every routine here takes a [`SlotObserver`] and
//! reports each slot it writes, as part of the same step that moves the entry.
//! The plain heap passes `()`, whose empty hook compiles away.
//!
//! Routines report only the slots *they* change. A caller that writes a slot
//! directly (appending, or filling a vacated slot) reports that write itself.

use std::mem::ManuallyDrop;
use std::ptr;

use crate::order::Compare;
use crate::storage::EntryStore;

/// Receives every slot write performed while restoring heap order
pub(crate) trait SlotObserver<V> {
    /// `value` now lives at `slot`
    fn slot_written(&mut self, value: &V, slot: usize);
}

impl<V> SlotObserver<V> for () {
    #[inline(always)]
    fn slot_written(&mut self, _value: &V, _slot: usize) {}
}

#[inline(always)]
pub(crate) fn parent(index: usize, d: usize) -> usize {
    (index - 1) / d
}

#[inline(always)]
pub(crate) fn first_child(index: usize, d: usize) -> usize {
    index * d + 1
}

/// An entry lifted out of the store, leaving a logically empty slot at `pos`
///
/// Dropping the hole writes the held entry back into `pos`, which keeps the
/// slices fully initialized even if a comparator or observer panics.
struct Hole<'a, S, V> {
    scores: &'a mut [S],
    values: &'a mut [V],
    score: ManuallyDrop<S>,
    value: ManuallyDrop<V>,
    pos: usize,
}

impl<'a, S, V> Hole<'a, S, V> {
    /// # Safety
    ///
    /// `pos` must be in bounds for both slices, which must have equal length.
    #[inline]
    unsafe fn new(scores: &'a mut [S], values: &'a mut [V], pos: usize) -> Self {
        debug_assert!(pos < scores.len() && scores.len() == values.len());
        // SAFETY: pos is in bounds; the slot is treated as vacant until Drop
        // writes the held entry back.
        let score = unsafe { ptr::read(scores.get_unchecked(pos)) };
        let value = unsafe { ptr::read(values.get_unchecked(pos)) };
        Hole {
            scores,
            values,
            score: ManuallyDrop::new(score),
            value: ManuallyDrop::new(value),
            pos,
        }
    }

    #[inline]
    fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    fn score(&self) -> &S {
        &self.score
    }

    #[inline]
    fn score_at(&self, index: usize) -> &S {
        debug_assert!(index != self.pos);
        &self.scores[index]
    }

    #[inline]
    fn value_at(&self, index: usize) -> &V {
        debug_assert!(index != self.pos);
        &self.values[index]
    }

    /// Scores of slots `first..=last`, which must all lie after the hole
    #[inline]
    fn scores_in(&self, first: usize, last: usize) -> &[S] {
        debug_assert!(self.pos < first);
        &self.scores[first..=last]
    }

    /// Moves the entry at `index` into the hole, leaving the hole at `index`
    ///
    /// # Safety
    ///
    /// `index` must be in bounds and differ from `pos`.
    #[inline]
    unsafe fn move_to(&mut self, index: usize) {
        debug_assert!(index != self.pos && index < self.scores.len());
        // SAFETY: both indices are in bounds and distinct, so the regions do
        // not overlap; the slot at `index` becomes the new vacancy.
        unsafe {
            let scores = self.scores.as_mut_ptr();
            ptr::copy_nonoverlapping(scores.add(index), scores.add(self.pos), 1);
            let values = self.values.as_mut_ptr();
            ptr::copy_nonoverlapping(values.add(index), values.add(self.pos), 1);
        }
        self.pos = index;
    }
}

impl<S, V> Drop for Hole<'_, S, V> {
    #[inline]
    fn drop(&mut self) {
        // SAFETY: pos is in bounds and vacant; the held entry is moved out of
        // its ManuallyDrop exactly once.
        unsafe {
            let pos = self.pos;
            ptr::write(
                self.scores.get_unchecked_mut(pos),
                ManuallyDrop::take(&mut self.score),
            );
            ptr::write(
                self.values.get_unchecked_mut(pos),
                ManuallyDrop::take(&mut self.value),
            );
        }
    }
}

/// Moves the entry at `pos` toward the root until its parent is no greater.
///
/// Returns the entry's final slot.
pub(crate) fn sift_up<S, V, C, O>(
    store: &mut EntryStore<S, V>,
    cmp: &C,
    d: usize,
    pos: usize,
    observer: &mut O,
) -> usize
where
    C: Compare<S>,
    O: SlotObserver<V>,
{
    let start = pos;
    let (scores, values) = store.slices_mut();
    // SAFETY: callers pass an occupied slot.
    let mut hole = unsafe { Hole::new(scores, values, pos) };
    while hole.pos() > 0 {
        let vacated = hole.pos();
        let up = parent(vacated, d);
        if cmp.le(hole.score_at(up), hole.score()) {
            break;
        }
        // SAFETY: up < vacated, so it is in bounds and not the hole.
        unsafe { hole.move_to(up) };
        observer.slot_written(hole.value_at(vacated), vacated);
    }
    let end = hole.pos();
    drop(hole);
    if end != start {
        observer.slot_written(&store.values()[end], end);
    }
    end
}

/// Moves the entry at `pos` toward the leaves until no child in
/// `0..=last` is smaller.
///
/// Returns the entry's final slot.
pub(crate) fn sift_down<S, V, C, O>(
    store: &mut EntryStore<S, V>,
    cmp: &C,
    d: usize,
    pos: usize,
    last: usize,
    observer: &mut O,
) -> usize
where
    C: Compare<S>,
    O: SlotObserver<V>,
{
    if last < 1 {
        return pos;
    }
    let limit = parent(last, d);
    if limit < pos {
        return pos;
    }

    let start = pos;
    let (scores, values) = store.slices_mut();
    // SAFETY: pos <= limit < last, and last is an occupied slot.
    let mut hole = unsafe { Hole::new(scores, values, pos) };
    while hole.pos() <= limit {
        let vacated = hole.pos();
        let first = first_child(vacated, d);
        let end = first + (d - 1).min(last - first);
        let child = first + cmp.min_index(hole.scores_in(first, end));
        if cmp.le(hole.score(), hole.score_at(child)) {
            break;
        }
        // SAFETY: child is in first..=last and first > vacated.
        unsafe { hole.move_to(child) };
        observer.slot_written(hole.value_at(vacated), vacated);
    }
    let end = hole.pos();
    drop(hole);
    if end != start {
        observer.slot_written(&store.values()[end], end);
    }
    end
}

/// Removes slot `index` and restores heap order around the entry that
/// replaces it.
///
/// The tail entry is moved into the vacancy. Its relation to its new parent
/// is unknown, so unlike a score update the direction cannot be inferred from
/// a before/after comparison: it is compared with the parent first, sifted
/// up if smaller, otherwise sifted down.
pub(crate) fn remove_at<S, V, C, O>(
    store: &mut EntryStore<S, V>,
    cmp: &C,
    d: usize,
    index: usize,
    observer: &mut O,
) -> (S, V)
where
    C: Compare<S>,
    O: SlotObserver<V>,
{
    let removed = store.swap_remove(index);
    let len = store.len();
    if index < len {
        observer.slot_written(&store.values()[index], index);
        let scores = store.scores();
        if index > 0 && cmp.lt(&scores[index], &scores[parent(index, d)]) {
            sift_up(store, cmp, d, index, observer);
        } else {
            sift_down(store, cmp, d, index, len - 1, observer);
        }
    }
    removed
}

/// Removes and returns the root entry; the store must not be empty.
///
/// The tail entry moves to the root and sifts down over the shrunken heap.
#[inline]
pub(crate) fn delete_root<S, V, C, O>(
    store: &mut EntryStore<S, V>,
    cmp: &C,
    d: usize,
    observer: &mut O,
) -> (S, V)
where
    C: Compare<S>,
    O: SlotObserver<V>,
{
    debug_assert!(!store.is_empty());
    let root = store.swap_remove(0);
    let len = store.len();
    if len > 0 {
        observer.slot_written(&store.values()[0], 0);
        sift_down(store, cmp, d, 0, len - 1, observer);
    }
    root
}

/// Replaces the score at `index` and moves the entry in whichever direction
/// the change requires. Returns the entry's final slot.
pub(crate) fn update_at<S, V, C, O>(
    store: &mut EntryStore<S, V>,
    cmp: &C,
    d: usize,
    index: usize,
    score: S,
    observer: &mut O,
) -> usize
where
    C: Compare<S>,
    O: SlotObserver<V>,
{
    let old = std::mem::replace(store.score_mut(index), score);
    let increased = cmp.lt(&old, &store.scores()[index]);
    if increased {
        let last = store.len() - 1;
        sift_down(store, cmp, d, index, last, observer)
    } else {
        sift_up(store, cmp, d, index, observer)
    }
}

/// Returns true if no entry is smaller than its parent
pub(crate) fn is_heap<S, C: Compare<S>>(scores: &[S], cmp: &C, d: usize) -> bool {
    (1..scores.len()).all(|i| !cmp.lt(&scores[i], &scores[parent(i, d)]))
}
