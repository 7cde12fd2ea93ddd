//! Axis with evenly spaced coordinate values.

use crate::error::{GridError, Result};
use crate::types::Extent;
use geo_common::next_equivalent_longitude;

/// An axis whose values are `first + index * spacing`.
///
/// Spacing may be negative for descending axes.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularAxis {
    name: String,
    first: f64,
    spacing: f64,
    size: usize,
    is_longitude: bool,
}

impl RegularAxis {
    pub fn new(
        name: impl Into<String>,
        first: f64,
        spacing: f64,
        size: usize,
        is_longitude: bool,
    ) -> Result<Self> {
        let name = name.into();
        if size == 0 {
            return Err(GridError::invalid_axis(name, "axis length must be > 0"));
        }
        if !first.is_finite() {
            return Err(GridError::invalid_axis(name, "first value must be finite"));
        }
        if spacing == 0.0 || !spacing.is_finite() {
            return Err(GridError::invalid_axis(
                name,
                format!("axis spacing must be finite and non-zero, got {}", spacing),
            ));
        }
        Ok(Self {
            name,
            first,
            spacing,
            size,
            is_longitude,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn first(&self) -> f64 {
        self.first
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_longitude(&self) -> bool {
        self.is_longitude
    }

    pub fn is_ascending(&self) -> bool {
        self.spacing > 0.0
    }

    pub fn coordinate_value(&self, index: usize) -> f64 {
        self.first + index as f64 * self.spacing
    }

    /// Bounds of a cell: its centre plus or minus half the spacing.
    pub fn coordinate_bounds(&self, index: usize) -> Extent {
        let centre = self.coordinate_value(index);
        let half = 0.5 * self.spacing.abs();
        Extent::new(centre - half, centre + half)
    }

    /// Range covered by all cell bounds, or the single value for a
    /// one-point axis.
    pub fn coordinate_extent(&self) -> Extent {
        let last = self.coordinate_value(self.size - 1);
        let (min, max) = (self.first.min(last), self.first.max(last));
        if self.size == 1 {
            Extent::new(min, max)
        } else {
            let half = 0.5 * self.spacing.abs();
            Extent::new(min - half, max + half)
        }
    }

    /// Index of the cell nearest to `value`, or `None` outside the axis.
    pub fn find_index_of(&self, value: f64) -> Option<usize> {
        if value.is_nan() {
            return None;
        }
        let value = if self.is_longitude {
            next_equivalent_longitude(self.coordinate_extent().low, value)
        } else {
            value
        };

        // Round half up, so the lower edge of the first cell is inside.
        let index = ((value - self.first) / self.spacing + 0.5).floor();
        if index < 0.0 || index >= self.size as f64 {
            return None;
        }
        Some(index as usize)
    }
}
