//! Target domains for extraction.

use crate::error::Result;
use crate::grid::HorizontalGrid;
use crate::pixel_map::PixelMap;
use geo_common::HorizontalPosition;

/// The set of points values are extracted for.
#[derive(Debug, Clone)]
pub enum TargetDomain {
    /// Every cell centre of a grid, row-major with x varying fastest.
    Grid(HorizontalGrid),
    /// An ordered list of points (transect, scattered points).
    Points(Vec<HorizontalPosition>),
}

impl TargetDomain {
    /// Number of points, including any that fall outside the source grid.
    pub fn size(&self) -> u64 {
        match self {
            Self::Grid(grid) => grid.size(),
            Self::Points(points) => points.len() as u64,
        }
    }

    /// Map each target point to its cell in `source`.
    pub fn pixel_map(&self, source: &HorizontalGrid) -> Result<PixelMap> {
        match self {
            Self::Grid(grid) => PixelMap::for_grid(source, grid),
            Self::Points(points) => PixelMap::for_list(source, points),
        }
    }
}

impl From<HorizontalGrid> for TargetDomain {
    fn from(grid: HorizontalGrid) -> Self {
        Self::Grid(grid)
    }
}

impl From<Vec<HorizontalPosition>> for TargetDomain {
    fn from(points: Vec<HorizontalPosition>) -> Self {
        Self::Points(points)
    }
}
