//! Heap construction parameters
//!
//! ```rust
//! use dheap::{DHeap, HeapConfig};
//!
//! let config = HeapConfig::default().with_d(8).with_capacity(1024);
//! let heap: DHeap<u64> = DHeap::with_config(config).unwrap();
//! assert_eq!(heap.d(), 8);
//! assert!(heap.capacity() >= 1024);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default branching factor
///
/// `d = 4` minimizes the `(d + 1) log n / log d` comparison count of a
/// push/pop pair, and keeps a node's children within one cache line for
/// `f64` scores.
pub const DEFAULT_D: usize = 4;

/// Largest accepted branching factor
pub const MAX_D: usize = i32::MAX as usize;

/// Default initial capacity, in entries
pub const DEFAULT_CAPACITY: usize = 32;

/// Default cap on a single growth step, in bytes of entry storage
pub const DEFAULT_MAX_GROWTH_BYTES: usize = 10 * 1024 * 1024;

/// Branching factor, initial capacity, and growth limit for a new heap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct HeapConfig {
    /// Maximum number of children per node
    pub d: usize,
    /// Entries to allocate up front
    pub capacity: usize,
    /// Largest number of entries a single growth step may add.
    /// `None` derives it from [`DEFAULT_MAX_GROWTH_BYTES`] and the entry size.
    pub max_growth: Option<usize>,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            d: DEFAULT_D,
            capacity: DEFAULT_CAPACITY,
            max_growth: None,
        }
    }
}

impl HeapConfig {
    /// Sets the branching factor
    pub fn with_d(mut self, d: usize) -> Self {
        self.d = d;
        self
    }

    /// Sets the initial capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Caps how many entries one growth step may add
    pub fn with_max_growth(mut self, entries: usize) -> Self {
        self.max_growth = Some(entries);
        self
    }

    /// Checks every field against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.d < 2 {
            return Err(ConfigError::ArityTooSmall(self.d));
        }
        if self.d > MAX_D {
            return Err(ConfigError::ArityTooLarge {
                d: self.d,
                max: MAX_D,
            });
        }
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.max_growth == Some(0) {
            return Err(ConfigError::ZeroGrowth);
        }
        Ok(())
    }

    /// Growth step limit in entries for entries of `entry_size` bytes
    pub(crate) fn max_growth_entries(&self, entry_size: usize) -> usize {
        match self.max_growth {
            Some(entries) => entries,
            None => (DEFAULT_MAX_GROWTH_BYTES / entry_size.max(1)).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = HeapConfig::default();
        assert_eq!(config.d, DEFAULT_D);
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_arity_bounds() {
        for d in 0..2 {
            assert_eq!(
                HeapConfig::default().with_d(d).validate(),
                Err(ConfigError::ArityTooSmall(d))
            );
        }
        assert_eq!(HeapConfig::default().with_d(2).validate(), Ok(()));
        assert_eq!(HeapConfig::default().with_d(MAX_D).validate(), Ok(()));
        assert_eq!(
            HeapConfig::default().with_d(MAX_D + 1).validate(),
            Err(ConfigError::ArityTooLarge {
                d: MAX_D + 1,
                max: MAX_D
            })
        );
    }

    #[test]
    fn test_zero_capacity_and_growth() {
        assert_eq!(
            HeapConfig::default().with_capacity(0).validate(),
            Err(ConfigError::ZeroCapacity)
        );
        assert_eq!(
            HeapConfig::default().with_max_growth(0).validate(),
            Err(ConfigError::ZeroGrowth)
        );
    }

    #[test]
    fn test_max_growth_entries() {
        let config = HeapConfig::default();
        assert_eq!(config.max_growth_entries(16), DEFAULT_MAX_GROWTH_BYTES / 16);
        assert_eq!(config.max_growth_entries(0), DEFAULT_MAX_GROWTH_BYTES);
        assert_eq!(config.max_growth_entries(usize::MAX), 1);
        assert_eq!(config.with_max_growth(7).max_growth_entries(16), 7);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_fills_defaults() {
        let config: HeapConfig = serde_json::from_str(r#"{"d": 8}"#).unwrap();
        assert_eq!(config, HeapConfig::default().with_d(8));

        let json = serde_json::to_string(&config.with_max_growth(64)).unwrap();
        let back: HeapConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.max_growth, Some(64));
    }
}
