//! d-ary Heap Priority Queues for Rust
//!
//! This crate provides an array-backed d-ary min-heap, the kind of priority
//! queue found beneath timer wheels, event schedulers, and admission-control
//! queues, where push and pop dominate the hot path.
//!
//! # Features
//!
//! - **[`DHeap`]**: `(score, value)` min-heap with a configurable branching
//!   factor `d`; O(log n / log d) push, O(d log n / log d) pop, O(1) peek,
//!   conditional and batch pops against a score threshold
//! - **[`DHeapMap`]**: the same heap plus a value index, so each value appears
//!   once and can be rescored in place or removed by value
//! - **[`Score`]**: a NaN-free `f64` with a documented conversion contract for
//!   every numeric type and [`Duration`](std::time::Duration)
//! - **Pluggable ordering**: [`ScoreOrder`], [`Natural`] for any `Ord` score,
//!   or [`FnOrder`] for a custom comparison function
//! - **Block min-child scan**: with the default `block-min` feature, the
//!   children of a node are compared in fixed-width blocks reduced pairwise
//!
//! # Example
//!
//! ```rust
//! use dheap::DHeap;
//!
//! let mut heap = DHeap::with_d(4).unwrap();
//! for (value, score) in [("e", 9), ("a", 1), ("c", 3), ("b", 2)] {
//!     heap.push(value, score).unwrap();
//! }
//! assert_eq!(heap.peek(), Some(&"a"));
//! assert_eq!(heap.pop_all_below(3, Vec::<&str>::new()).unwrap(), vec!["a", "b"]);
//! assert_eq!(heap.pop(), Some("c"));
//! ```
//!
//! # Cargo features
//!
//! - `block-min` (default): blocked min-child reduction for [`Score`] heaps
//! - `serde`: `Serialize`/`Deserialize` for [`HeapConfig`]

pub mod config;
pub mod dheap;
pub mod error;
pub mod map;
pub mod min_child;
pub mod order;
pub mod score;
mod sift;
pub mod storage;
pub mod traits;

pub use config::{HeapConfig, DEFAULT_CAPACITY, DEFAULT_D, DEFAULT_MAX_GROWTH_BYTES, MAX_D};
pub use dheap::{DHeap, DrainSorted};
pub use error::{ConfigError, HeapError};
pub use map::DHeapMap;
pub use order::{Compare, FnOrder, Natural, ScoreOrder};
pub use score::{IntoScore, Score, ScoreError, MAX_EXACT_INT};
pub use traits::{IndexedPriorityQueue, PriorityQueue};
