//! One-dimensional index/coordinate mappings.
//!
//! A [`ReferenceableAxis`] is either [`RegularAxis`] (closed-form
//! arithmetic) or [`IrregularAxis`] (binary search over stored values).
//! Longitude axes treat `v` and `v + 360` as the same position.

mod irregular;
mod regular;

pub use irregular::IrregularAxis;
pub use regular::RegularAxis;

use crate::error::Result;
use crate::types::Extent;

/// A one-dimensional axis of coordinate values.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceableAxis {
    Regular(RegularAxis),
    Irregular(IrregularAxis),
}

impl ReferenceableAxis {
    /// Create a regular axis.
    pub fn regular(
        name: impl Into<String>,
        first: f64,
        spacing: f64,
        size: usize,
        is_longitude: bool,
    ) -> Result<Self> {
        RegularAxis::new(name, first, spacing, size, is_longitude).map(Self::Regular)
    }

    /// Create an irregular axis from strictly monotonic values.
    pub fn irregular(name: impl Into<String>, values: Vec<f64>, is_longitude: bool) -> Result<Self> {
        IrregularAxis::new(name, values, is_longitude).map(Self::Irregular)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Regular(a) => a.name(),
            Self::Irregular(a) => a.name(),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Self::Regular(a) => a.size(),
            Self::Irregular(a) => a.size(),
        }
    }

    pub fn is_longitude(&self) -> bool {
        match self {
            Self::Regular(a) => a.is_longitude(),
            Self::Irregular(a) => a.is_longitude(),
        }
    }

    pub fn is_ascending(&self) -> bool {
        match self {
            Self::Regular(a) => a.is_ascending(),
            Self::Irregular(a) => a.is_ascending(),
        }
    }

    pub fn is_regular(&self) -> bool {
        matches!(self, Self::Regular(_))
    }

    /// Coordinate value at `index`.
    pub fn coordinate_value(&self, index: usize) -> f64 {
        match self {
            Self::Regular(a) => a.coordinate_value(index),
            Self::Irregular(a) => a.coordinate_value(index),
        }
    }

    /// All coordinate values in index order.
    pub fn coordinate_values(&self) -> Vec<f64> {
        (0..self.size()).map(|i| self.coordinate_value(i)).collect()
    }

    /// Bounds of the cell at `index`.
    pub fn coordinate_bounds(&self, index: usize) -> Extent {
        match self {
            Self::Regular(a) => a.coordinate_bounds(index),
            Self::Irregular(a) => a.coordinate_bounds(index),
        }
    }

    /// Range spanned by the whole axis.
    pub fn coordinate_extent(&self) -> Extent {
        match self {
            Self::Regular(a) => a.coordinate_extent(),
            Self::Irregular(a) => a.coordinate_extent(),
        }
    }

    /// Index of the cell holding `value`, or `None` when outside the axis.
    pub fn find_index_of(&self, value: f64) -> Option<usize> {
        match self {
            Self::Regular(a) => a.find_index_of(value),
            Self::Irregular(a) => a.find_index_of(value),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.find_index_of(value).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_and_irregular_agree() {
        let regular = ReferenceableAxis::regular("lon", -180.0, 2.5, 144, true).unwrap();
        let irregular =
            ReferenceableAxis::irregular("lon", regular.coordinate_values(), true).unwrap();

        for value in [-181.0, -180.0, -3.7, 0.0, 88.8, 177.4, 179.0, 540.0] {
            assert_eq!(
                regular.find_index_of(value),
                irregular.find_index_of(value),
                "value {}",
                value
            );
        }
        assert_eq!(regular.coordinate_extent(), irregular.coordinate_extent());
    }

    #[test]
    fn test_contains() {
        let axis = ReferenceableAxis::irregular("z", vec![1.0, 2.0, 4.0], false).unwrap();
        assert!(axis.contains(4.9));
        assert!(!axis.contains(5.1));
        assert!(!axis.is_regular());
        assert_eq!(axis.name(), "z");
    }
}
