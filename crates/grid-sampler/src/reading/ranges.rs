//! Index ranges for a single block read.

use super::variable::DimensionLayout;
use crate::error::{GridError, Result};
use std::fmt;
use std::ops::RangeInclusive;

/// Per-dimension inclusive ranges in the physical order of a variable.
///
/// Every dimension starts at `0..=0`. Setting the range of a logical axis the
/// variable does not have is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangesList {
    ranges: Vec<RangeInclusive<usize>>,
    layout: DimensionLayout,
}

impl RangesList {
    pub fn new(layout: DimensionLayout) -> Self {
        Self {
            ranges: vec![0..=0; layout.rank],
            layout,
        }
    }

    pub fn set_x_range(&mut self, min: usize, max: usize) {
        self.set_range(Some(self.layout.x), min, max);
    }

    pub fn set_y_range(&mut self, min: usize, max: usize) {
        self.set_range(Some(self.layout.y), min, max);
    }

    pub fn set_z_range(&mut self, min: usize, max: usize) {
        self.set_range(self.layout.z, min, max);
    }

    pub fn set_t_range(&mut self, min: usize, max: usize) {
        self.set_range(self.layout.t, min, max);
    }

    fn set_range(&mut self, position: Option<usize>, min: usize, max: usize) {
        if let Some(position) = position {
            self.ranges[position] = min..=max;
        }
    }

    pub fn layout(&self) -> &DimensionLayout {
        &self.layout
    }

    /// Ranges in physical dimension order.
    pub fn ranges(&self) -> &[RangeInclusive<usize>] {
        &self.ranges
    }

    /// First index of every dimension.
    pub fn start(&self) -> Vec<usize> {
        self.ranges.iter().map(|r| *r.start()).collect()
    }

    /// Number of indices covered in every dimension.
    pub fn shape(&self) -> Vec<usize> {
        self.ranges
            .iter()
            .map(|r| (r.end() + 1).saturating_sub(*r.start()))
            .collect()
    }

    /// Total number of values covered.
    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check every range is non-empty and lies within `shape`.
    pub fn validate(&self, shape: &[usize]) -> Result<()> {
        if shape.len() != self.ranges.len() {
            return Err(GridError::invalid_range(format!(
                "{} ranges for a variable of rank {}",
                self.ranges.len(),
                shape.len()
            )));
        }
        for (dim, (range, &size)) in self.ranges.iter().zip(shape).enumerate() {
            if range.is_empty() || *range.end() >= size {
                return Err(GridError::invalid_range(format!(
                    "{}:{} outside dimension {} of size {}",
                    range.start(),
                    range.end(),
                    dim,
                    size
                )));
            }
        }
        Ok(())
    }

    fn describe(&self, position: Option<usize>) -> String {
        match position {
            Some(p) => format!("{}:{}", self.ranges[p].start(), self.ranges[p].end()),
            None => "none".to_string(),
        }
    }
}

impl fmt::Display for RangesList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tRange: {}, zRange: {}, yRange: {}, xRange: {}",
            self.describe(self.layout.t),
            self.describe(self.layout.z),
            self.describe(Some(self.layout.y)),
            self.describe(Some(self.layout.x))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_order() {
        // Stored as [x, t, y]
        let layout = DimensionLayout::new(3, Some(1), None, 2, 0).unwrap();
        let mut ranges = RangesList::new(layout);
        ranges.set_x_range(4, 9);
        ranges.set_y_range(2, 2);
        ranges.set_t_range(7, 7);

        assert_eq!(ranges.ranges(), &[4..=9, 7..=7, 2..=2]);
        assert_eq!(ranges.start(), vec![4, 7, 2]);
        assert_eq!(ranges.shape(), vec![6, 1, 1]);
        assert_eq!(ranges.len(), 6);
    }

    #[test]
    fn test_absent_axis_is_noop() {
        let layout = DimensionLayout::from_rank(2).unwrap();
        let mut ranges = RangesList::new(layout);
        ranges.set_z_range(3, 5);
        ranges.set_t_range(1, 1);
        assert_eq!(ranges.ranges(), &[0..=0, 0..=0]);
    }

    #[test]
    fn test_validate() {
        let layout = DimensionLayout::from_rank(2).unwrap();
        let mut ranges = RangesList::new(layout);
        ranges.set_x_range(0, 3);
        ranges.set_y_range(1, 2);
        assert!(ranges.validate(&[3, 4]).is_ok());
        assert!(ranges.validate(&[3, 3]).is_err());
        assert!(ranges.validate(&[3, 4, 1]).is_err());

        ranges.set_x_range(3, 2);
        assert!(ranges.is_empty());
        assert!(ranges.validate(&[3, 4]).is_err());
    }

    #[test]
    fn test_display() {
        let layout = DimensionLayout::from_rank(3).unwrap();
        let mut ranges = RangesList::new(layout);
        ranges.set_x_range(10, 20);
        ranges.set_y_range(5, 5);
        assert_eq!(
            ranges.to_string(),
            "tRange: 0:0, zRange: none, yRange: 5:5, xRange: 10:20"
        );
    }
}
