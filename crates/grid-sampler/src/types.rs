//! Core types shared by grids, pixel maps and reading strategies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a cell in a horizontal grid: `i` along x, `j` along y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridIndex {
    pub i: usize,
    pub j: usize,
}

impl GridIndex {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

impl fmt::Display for GridIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// A closed interval `[low, high]` of coordinate values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub low: f64,
    pub high: f64,
}

impl Extent {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Inclusive at both ends. Never contains NaN.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

/// Inclusive min/max of matched source indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexBounds {
    pub min_i: usize,
    pub max_i: usize,
    pub min_j: usize,
    pub max_j: usize,
}

impl IndexBounds {
    /// Bounds covering a single cell.
    pub fn at(i: usize, j: usize) -> Self {
        Self {
            min_i: i,
            max_i: i,
            min_j: j,
            max_j: j,
        }
    }

    /// Grow to cover another cell.
    pub fn include(&mut self, i: usize, j: usize) {
        self.min_i = self.min_i.min(i);
        self.max_i = self.max_i.max(i);
        self.min_j = self.min_j.min(j);
        self.max_j = self.max_j.max(j);
    }

    pub fn width(&self) -> usize {
        self.max_i - self.min_i + 1
    }

    pub fn height(&self) -> usize {
        self.max_j - self.min_j + 1
    }

    /// Number of cells in the rectangle.
    pub fn size(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// Statistics about the lookup-table cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 - 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
