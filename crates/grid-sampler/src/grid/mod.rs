//! Two-dimensional horizontal grids.
//!
//! Four variants share one lookup contract:
//! - [`RectilinearGrid`]: independent x and y axes, positions in the grid CRS
//! - [`ProjectedGrid`]: rectilinear in a native CRS, positions transformed
//! - [`CurvilinearGrid`]: explicit cell coordinates, lookup-table search
//! - [`StaggeredGrid`]: half a cell off another grid, searched through it

mod curvilinear;
mod rectilinear;
mod staggered;

pub use curvilinear::CurvilinearGrid;
pub use rectilinear::{ProjectedGrid, RectilinearGrid};
pub use staggered::{StaggerPadding, StaggeredGrid};

use crate::axis::ReferenceableAxis;
use crate::error::Result;
use crate::types::GridIndex;
use geo_common::{CrsCode, HorizontalPosition};

/// A horizontal grid of cells indexed by `(i, j)`.
#[derive(Debug, Clone)]
pub enum HorizontalGrid {
    Rectilinear(RectilinearGrid),
    Projected(ProjectedGrid),
    Curvilinear(CurvilinearGrid),
    Staggered(StaggeredGrid),
}

impl HorizontalGrid {
    /// Number of cells along x.
    pub fn x_size(&self) -> usize {
        match self {
            Self::Rectilinear(g) => g.x_size(),
            Self::Projected(g) => g.rectilinear().x_size(),
            Self::Curvilinear(g) => g.coords().ni(),
            Self::Staggered(g) => g.x_size(),
        }
    }

    /// Number of cells along y.
    pub fn y_size(&self) -> usize {
        match self {
            Self::Rectilinear(g) => g.y_size(),
            Self::Projected(g) => g.rectilinear().y_size(),
            Self::Curvilinear(g) => g.coords().nj(),
            Self::Staggered(g) => g.y_size(),
        }
    }

    /// Total number of cells.
    pub fn size(&self) -> u64 {
        self.x_size() as u64 * self.y_size() as u64
    }

    /// CRS of the cell centres.
    pub fn crs(&self) -> CrsCode {
        match self {
            Self::Rectilinear(g) => g.crs(),
            Self::Projected(g) => g.crs(),
            Self::Curvilinear(_) => CrsCode::Epsg4326,
            Self::Staggered(g) => g.crs(),
        }
    }

    /// Cell containing `position`, or `None` when outside the grid.
    pub fn find_index_of(&self, position: &HorizontalPosition) -> Result<Option<GridIndex>> {
        if position.is_missing() {
            return Ok(None);
        }
        match self {
            Self::Rectilinear(g) => g.find_index_of(position),
            Self::Projected(g) => g.find_index_of(position),
            Self::Curvilinear(g) => g.find_index_of(position),
            Self::Staggered(g) => g.find_index_of(position),
        }
    }

    /// Centre of cell `index` in [`crs`](Self::crs).
    pub fn cell_centre(&self, index: GridIndex) -> HorizontalPosition {
        match self {
            Self::Rectilinear(g) => g.cell_centre(index),
            Self::Projected(g) => g.rectilinear().cell_centre(index),
            Self::Curvilinear(g) => g.cell_centre(index),
            Self::Staggered(g) => g.cell_centre(index),
        }
    }

    /// Footprint vertices of cell `index` in [`crs`](Self::crs).
    pub fn cell_footprint(&self, index: GridIndex) -> Vec<HorizontalPosition> {
        match self {
            Self::Rectilinear(g) => g.cell_footprint(index),
            Self::Projected(g) => g.rectilinear().cell_footprint(index),
            Self::Curvilinear(g) => g
                .coords()
                .cell(index.i, index.j)
                .map(|cell| {
                    cell.corners()
                        .iter()
                        .map(|p| HorizontalPosition::lon_lat(p.x, p.y))
                        .collect()
                })
                .unwrap_or_default(),
            Self::Staggered(g) => g.cell_footprint(index),
        }
    }

    /// Cell centres in row-major order (x varies fastest).
    pub fn positions(&self) -> impl Iterator<Item = HorizontalPosition> + '_ {
        let nx = self.x_size();
        (0..self.y_size())
            .flat_map(move |j| (0..nx).map(move |i| GridIndex::new(i, j)))
            .map(move |index| self.cell_centre(index))
    }

    /// The x and y axes when this grid is rectilinear in WGS84 lon/lat.
    pub fn lon_lat_axes(&self) -> Option<(&ReferenceableAxis, &ReferenceableAxis)> {
        let grid = match self {
            Self::Rectilinear(g) => g,
            Self::Projected(g) => g.rectilinear(),
            Self::Curvilinear(_) | Self::Staggered(_) => return None,
        };
        grid.crs()
            .is_wgs84_lonlat()
            .then(|| (grid.x_axis(), grid.y_axis()))
    }
}

impl From<RectilinearGrid> for HorizontalGrid {
    fn from(grid: RectilinearGrid) -> Self {
        Self::Rectilinear(grid)
    }
}

impl From<ProjectedGrid> for HorizontalGrid {
    fn from(grid: ProjectedGrid) -> Self {
        Self::Projected(grid)
    }
}

impl From<CurvilinearGrid> for HorizontalGrid {
    fn from(grid: CurvilinearGrid) -> Self {
        Self::Curvilinear(grid)
    }
}

impl From<StaggeredGrid> for HorizontalGrid {
    fn from(grid: StaggeredGrid) -> Self {
        Self::Staggered(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lon_lat_grid() -> HorizontalGrid {
        RectilinearGrid::new(
            ReferenceableAxis::regular("lon", 0.0, 1.0, 4, true).unwrap(),
            ReferenceableAxis::regular("lat", 10.0, 1.0, 3, false).unwrap(),
            CrsCode::Epsg4326,
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_positions_are_row_major() {
        let grid = lon_lat_grid();
        assert_eq!(grid.size(), 12);
        let positions: Vec<_> = grid.positions().collect();
        assert_eq!(positions.len(), 12);
        assert_eq!((positions[1].x, positions[1].y), (1.0, 10.0));
        assert_eq!((positions[4].x, positions[4].y), (0.0, 11.0));
        assert_eq!((positions[11].x, positions[11].y), (3.0, 12.0));
    }

    #[test]
    fn test_centres_find_themselves() {
        let grid = lon_lat_grid();
        for (k, pos) in grid.positions().enumerate() {
            let index = grid.find_index_of(&pos).unwrap().unwrap();
            assert_eq!(index.j * grid.x_size() + index.i, k);
        }
    }

    #[test]
    fn test_missing_position() {
        let grid = lon_lat_grid();
        let pos = HorizontalPosition::lon_lat(f64::NAN, 10.0);
        assert_eq!(grid.find_index_of(&pos).unwrap(), None);
        assert!(grid.lon_lat_axes().is_some());
    }

    #[test]
    fn test_rectilinear_footprint() {
        let grid = lon_lat_grid();
        let footprint: Vec<_> = grid
            .cell_footprint(GridIndex::new(1, 2))
            .iter()
            .map(|p| (p.x, p.y))
            .collect();
        assert_eq!(
            footprint,
            vec![(0.5, 11.5), (1.5, 11.5), (1.5, 12.5), (0.5, 12.5)]
        );
    }
}
