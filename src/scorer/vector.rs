use crate::core_types::CategoryId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-width vector of non-negative counts, indexed by category.
///
/// The width is chosen once per run (the number of categories) and every
/// vector taking part in an operation must share it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryVector(Vec<u32>);

impl CategoryVector {
    /// All-zero vector of the given width.
    pub fn zeros(width: usize) -> Self {
        Self(vec![0; width])
    }

    pub fn from_counts(counts: Vec<u32>) -> Self {
        Self(counts)
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.0.len()
    }

    #[inline(always)]
    pub fn get(&self, category: CategoryId) -> u32 {
        self.0[category]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    #[inline(always)]
    pub(crate) fn increment(&mut self, category: CategoryId) {
        self.0[category] += 1;
    }

    #[inline(always)]
    pub(crate) fn decrement(&mut self, category: CategoryId) {
        debug_assert!(self.0[category] > 0, "histogram underflow at {}", category);
        self.0[category] -= 1;
    }

    /// Scalar (dot) product.
    #[inline(always)]
    pub fn smul(&self, other: &CategoryVector) -> u64 {
        debug_assert_eq!(self.width(), other.width());
        self.0
            .iter()
            .zip(&other.0)
            .map(|(&a, &b)| a as u64 * b as u64)
            .sum()
    }

    /// Elementwise sum.
    pub fn add(&self, other: &CategoryVector) -> CategoryVector {
        debug_assert_eq!(self.width(), other.width());
        Self(self.0.iter().zip(&other.0).map(|(a, b)| a + b).collect())
    }

    /// 1 where the entry is positive, 0 elsewhere.
    pub fn mask(&self) -> CategoryVector {
        Self(self.0.iter().map(|&x| u32::from(x > 0)).collect())
    }

    pub fn sum(&self) -> u64 {
        self.0.iter().map(|&x| x as u64).sum()
    }

    /// Each entry divided by `sum()`. An all-zero vector normalises to all zeros.
    pub fn normalised(&self) -> Vec<f64> {
        let total = self.sum();
        if total == 0 {
            return vec![0.0; self.width()];
        }
        self.0.iter().map(|&x| x as f64 / total as f64).collect()
    }

    /// Number of categories with a positive count.
    pub fn num_nonzero(&self) -> usize {
        self.0.iter().filter(|&&x| x > 0).count()
    }

    /// Sum of this vector's counts over categories that are positive in both vectors.
    pub fn num_overlapping(&self, other: &CategoryVector) -> u64 {
        debug_assert_eq!(self.width(), other.width());
        self.0
            .iter()
            .zip(&other.0)
            .filter(|&(_, &o)| o > 0)
            .map(|(&n, _)| n as u64)
            .sum()
    }

    /// Counts beyond the first per category, summed.
    pub fn num_excess(&self) -> u64 {
        self.0
            .iter()
            .filter(|&&x| x > 1)
            .map(|&x| (x - 1) as u64)
            .sum()
    }
}

impl fmt::Display for CategoryVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, x) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", x)?;
        }
        write!(f, "]")
    }
}
