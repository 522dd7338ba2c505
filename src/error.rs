//! Error types for heap construction and mutation
//!
//! Every fallible operation validates its inputs before touching storage, so
//! an `Err` always means the heap is exactly as it was before the call.
//!
//! Empty heaps and unmet `pop_lt`/`pop_lte` thresholds are not errors; those
//! calls return `Ok(None)`.

use thiserror::Error;

use crate::score::ScoreError;

/// Errors returned by heap operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The heap configuration was rejected
    #[error("invalid heap configuration: {0}")]
    Configuration(#[from] ConfigError),

    /// A score or threshold could not be converted into a totally ordered score
    #[error("score conversion failed: {0}")]
    Score(#[from] ScoreError),

    /// Growing the heap would exceed the maximum representable entry count
    #[error("cannot hold {requested} entries (maximum is {max})")]
    CapacityOverflow {
        /// Number of entries that would have been required
        requested: usize,
        /// Maximum number of entries the store can address
        max: usize,
    },

    /// A relocation callback produced the same value for two live entries
    #[error("relocated values are not unique")]
    DuplicateValue,
}

/// Invalid [`HeapConfig`](crate::config::HeapConfig) values
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `d` is below 2
    #[error("d={0} is too small (minimum is 2)")]
    ArityTooSmall(usize),

    /// `d` is above [`MAX_D`](crate::MAX_D)
    #[error("d={d} is too large (maximum is {max})")]
    ArityTooLarge {
        /// The rejected branching factor
        d: usize,
        /// Largest branching factor a heap accepts
        max: usize,
    },

    /// The initial capacity is zero
    #[error("initial capacity must be at least 1")]
    ZeroCapacity,

    /// The maximum growth increment is zero
    #[error("maximum growth increment must be at least 1")]
    ZeroGrowth,
}
