//! Score domain
//!
//! [`Score`] is the default priority type: an `f64` that is guaranteed not to
//! be NaN, so it has a cheap total order. Callers hand the heap anything that
//! implements [`IntoScore`]; conversion happens exactly once, when an entry is
//! pushed or updated, and a failed conversion leaves the heap untouched.
//!
//! # Precision
//!
//! | Input | Conversion |
//! |-------|------------|
//! | `i8`..`i32`, `u8`..`u32`, `f32` | exact |
//! | `i64`, `u64`, `isize`, `usize`, `i128`, `u128` | exact when `|n| <= 2^53`, otherwise rounded to the nearest `f64` |
//! | `f64` | as-is; NaN is rejected, infinities are accepted |
//! | [`Duration`] | seconds, as `f64` |
//!
//! Use [`Score::exact_i64`] or [`Score::exact_u64`] when rounding a large
//! integer would be a bug rather than an acceptable loss.
//!
//! `-0.0` is normalized to `0.0`, so `Score::new(-0.0) == Score::new(0.0)`.

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Largest integer magnitude that survives a round trip through `f64`.
pub const MAX_EXACT_INT: u64 = 1 << 53;

/// Reasons a value cannot become a [`Score`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    /// The input was NaN, which has no position in a total order
    #[error("score is NaN")]
    NotANumber,

    /// An exact conversion was requested but the integer needs more than 53 bits
    #[error("integer {0} cannot be represented exactly as a score")]
    Inexact(i128),
}

/// A totally ordered, non-NaN `f64` priority.
#[derive(Clone, Copy, Default)]
pub struct Score(f64);

impl Score {
    /// The zero score
    pub const ZERO: Score = Score(0.0);
    /// Orders after every finite score
    pub const INFINITY: Score = Score(f64::INFINITY);
    /// Orders before every finite score
    pub const NEG_INFINITY: Score = Score(f64::NEG_INFINITY);

    /// Creates a score, rejecting NaN.
    #[inline]
    pub fn new(value: f64) -> Result<Self, ScoreError> {
        if value.is_nan() {
            return Err(ScoreError::NotANumber);
        }
        // collapse -0.0 so total_cmp agrees with ==
        Ok(Score(value + 0.0))
    }

    /// Converts an `i64`, failing instead of rounding when it needs more than 53 bits.
    pub fn exact_i64(value: i64) -> Result<Self, ScoreError> {
        let f = value as f64;
        if f as i128 == value as i128 {
            Ok(Score(f))
        } else {
            Err(ScoreError::Inexact(value as i128))
        }
    }

    /// Converts a `u64`, failing instead of rounding when it needs more than 53 bits.
    pub fn exact_u64(value: u64) -> Result<Self, ScoreError> {
        let f = value as f64;
        if f as u128 == value as u128 {
            Ok(Score(f))
        } else {
            Err(ScoreError::Inexact(value as i128))
        }
    }

    /// Returns the underlying `f64`.
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl PartialEq for Score {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }

    #[inline]
    fn lt(&self, other: &Self) -> bool {
        self.0 < other.0
    }

    #[inline]
    fn le(&self, other: &Self) -> bool {
        self.0 <= other.0
    }
}

impl Ord for Score {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> f64 {
        score.0
    }
}

impl TryFrom<f64> for Score {
    type Error = ScoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Score::new(value)
    }
}

/// Conversion into a heap's score type.
///
/// Every type converts into itself, which is how heaps with a custom score
/// type and comparator accept their scores. The numeric conversions into
/// [`Score`] follow the precision table in the [module docs](self).
pub trait IntoScore<S> {
    /// Performs the conversion.
    fn into_score(self) -> Result<S, ScoreError>;
}

impl<S> IntoScore<S> for S {
    #[inline]
    fn into_score(self) -> Result<S, ScoreError> {
        Ok(self)
    }
}

macro_rules! impl_exact_into_score {
    ($($t:ty),+) => {
        $(
            impl IntoScore<Score> for $t {
                #[inline]
                fn into_score(self) -> Result<Score, ScoreError> {
                    Score::new(f64::from(self))
                }
            }
        )+
    };
}

macro_rules! impl_rounding_into_score {
    ($($t:ty),+) => {
        $(
            impl IntoScore<Score> for $t {
                #[inline]
                fn into_score(self) -> Result<Score, ScoreError> {
                    // integer-to-float `as` rounds to nearest, ties to even
                    Score::new(self as f64)
                }
            }
        )+
    };
}

impl_exact_into_score!(i8, i16, i32, u8, u16, u32, f32, f64);
impl_rounding_into_score!(i64, u64, isize, usize, i128, u128);

impl IntoScore<Score> for Duration {
    #[inline]
    fn into_score(self) -> Result<Score, ScoreError> {
        Score::new(self.as_secs_f64())
    }
}
