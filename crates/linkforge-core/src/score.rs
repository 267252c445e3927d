//! AlignmentScore - additive log-probability score of a partial solution

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use crate::alignment::Alignment;

/// Epsilon keeping `ln(p + 1 + EPS)` strictly positive for `p = 0`.
pub const EPS: f64 = 1e-10;

/// Score contribution of committing an alignment with `probability`.
///
/// `delta(p) = ln(p + 1 + EPS)` is strictly positive and monotonic in `p`,
/// so adding an alignment never lowers a score.
///
/// ```
/// use linkforge_core::delta;
///
/// assert!(delta(0.0) > 0.0);
/// assert!(delta(0.9) > delta(0.5));
/// ```
#[inline]
pub fn delta(probability: f64) -> f64 {
    (probability + 1.0 + EPS).ln()
}

/// The running score of a constraint state.
///
/// Wraps an `f64` with a total order (`f64::total_cmp`) so scores can key
/// ordered collections.
///
/// # Examples
///
/// ```
/// use linkforge_core::AlignmentScore;
///
/// let empty = AlignmentScore::ZERO;
/// let one = empty.add_probability(0.5);
///
/// assert!(one > empty);
/// assert!((one.value() - 1.5_f64.ln()).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Default)]
pub struct AlignmentScore {
    value: f64,
}

impl AlignmentScore {
    /// The score of an empty solution.
    pub const ZERO: AlignmentScore = AlignmentScore { value: 0.0 };

    /// Creates a score with the given value.
    #[inline]
    pub const fn of(value: f64) -> Self {
        AlignmentScore { value }
    }

    /// Returns the raw value.
    #[inline]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns this score plus `delta(probability)`.
    #[inline]
    pub fn add_probability(self, probability: f64) -> Self {
        AlignmentScore::of(self.value + delta(probability))
    }

    /// Returns this score plus the contribution of `alignment`.
    #[inline]
    pub fn add_alignment(self, alignment: &Alignment) -> Self {
        self.add_probability(alignment.probability())
    }
}

impl PartialEq for AlignmentScore {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AlignmentScore {}

impl Ord for AlignmentScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.total_cmp(&other.value)
    }
}

impl PartialOrd for AlignmentScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for AlignmentScore {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        AlignmentScore::of(self.value + other.value)
    }
}

impl AddAssign for AlignmentScore {
    fn add_assign(&mut self, other: Self) {
        self.value += other.value;
    }
}

impl Sub for AlignmentScore {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        AlignmentScore::of(self.value - other.value)
    }
}

impl fmt::Debug for AlignmentScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AlignmentScore({})", self.value)
    }
}

impl fmt::Display for AlignmentScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.value)
    }
}

impl From<f64> for AlignmentScore {
    fn from(value: f64) -> Self {
        AlignmentScore::of(value)
    }
}
