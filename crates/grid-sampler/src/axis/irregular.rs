//! Axis with explicitly listed coordinate values.

use crate::error::{GridError, Result};
use crate::types::Extent;
use geo_common::next_equivalent_longitude;

/// An axis defined by a strictly monotonic list of values.
///
/// Values are stored ascending. A descending input is reversed on
/// construction and indices are mapped back on every read, so lookups
/// always binary-search an ascending slice.
#[derive(Debug, Clone, PartialEq)]
pub struct IrregularAxis {
    name: String,
    values: Vec<f64>,
    reversed: bool,
    is_longitude: bool,
}

impl IrregularAxis {
    pub fn new(name: impl Into<String>, values: Vec<f64>, is_longitude: bool) -> Result<Self> {
        let name = name.into();
        if values.is_empty() {
            return Err(GridError::invalid_axis(name, "zero-length coordinate array"));
        }
        if values.iter().any(|v| v.is_nan()) {
            return Err(GridError::invalid_axis(name, "coordinate values contain NaN"));
        }

        let mut values = values;
        let reversed = values.len() > 1 && values[1] < values[0];
        if reversed {
            values.reverse();
        }
        if values.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GridError::invalid_axis(
                name,
                "coordinate values must increase or decrease monotonically",
            ));
        }

        Ok(Self {
            name,
            values,
            reversed,
            is_longitude,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn is_longitude(&self) -> bool {
        self.is_longitude
    }

    pub fn is_ascending(&self) -> bool {
        !self.reversed
    }

    fn external(&self, index: usize) -> usize {
        if self.reversed {
            self.values.len() - 1 - index
        } else {
            index
        }
    }

    /// # Panics
    ///
    /// Panics if `index >= size()`.
    pub fn coordinate_value(&self, index: usize) -> f64 {
        self.values[self.external(index)]
    }

    /// Bounds from midpoints with the neighbouring values, extended by half
    /// a step at either end of the axis.
    pub fn coordinate_bounds(&self, index: usize) -> Extent {
        self.ascending_bounds(self.external(index))
    }

    pub fn coordinate_extent(&self) -> Extent {
        let n = self.values.len();
        if n == 1 {
            return Extent::new(self.values[0], self.values[0]);
        }
        let low = self.values[0] - 0.5 * (self.values[1] - self.values[0]);
        let high = self.values[n - 1] + 0.5 * (self.values[n - 1] - self.values[n - 2]);
        Extent::new(low, high)
    }

    fn ascending_bounds(&self, k: usize) -> Extent {
        let n = self.values.len();
        let extent = self.coordinate_extent();
        let low = if k == 0 {
            extent.low
        } else {
            0.5 * (self.values[k] + self.values[k - 1])
        };
        let high = if k == n - 1 {
            extent.high
        } else {
            0.5 * (self.values[k + 1] + self.values[k])
        };
        Extent::new(low, high)
    }

    /// Index of the nearest value whose bounds hold `value`.
    pub fn find_index_of(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let value = if self.is_longitude {
            next_equivalent_longitude(self.coordinate_extent().low, value)
        } else {
            value
        };

        let n = self.values.len();
        let insertion = self.values.partition_point(|&v| v < value);
        if insertion < n && self.values[insertion] == value {
            return Some(self.external(insertion));
        }
        if insertion == 0 || insertion == n {
            let edge = if insertion == 0 { 0 } else { n - 1 };
            return self
                .ascending_bounds(edge)
                .contains(value)
                .then(|| self.external(edge));
        }

        let above = self.values[insertion] - value;
        let below = value - self.values[insertion - 1];
        let nearest = if above < below {
            insertion
        } else {
            insertion - 1
        };
        Some(self.external(nearest))
    }
}
