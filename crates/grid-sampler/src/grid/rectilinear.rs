//! Grids formed from two independent axes.

use crate::axis::ReferenceableAxis;
use crate::error::{GridError, Result};
use crate::types::GridIndex;
use geo_common::{CrsCode, HorizontalPosition};
use projection::{ProjectionError, TransformService};
use std::sync::Arc;

/// A grid whose x and y coordinates vary independently.
#[derive(Debug, Clone, PartialEq)]
pub struct RectilinearGrid {
    x_axis: ReferenceableAxis,
    y_axis: ReferenceableAxis,
    crs: CrsCode,
}

impl RectilinearGrid {
    pub fn new(x_axis: ReferenceableAxis, y_axis: ReferenceableAxis, crs: CrsCode) -> Result<Self> {
        if y_axis.is_longitude() {
            return Err(GridError::invalid_grid(format!(
                "y axis '{}' cannot be a longitude axis",
                y_axis.name()
            )));
        }
        if x_axis.is_longitude() && !crs.is_geographic() {
            return Err(GridError::invalid_grid(format!(
                "longitude axis '{}' requires a geographic CRS, got {}",
                x_axis.name(),
                crs
            )));
        }
        Ok(Self { x_axis, y_axis, crs })
    }

    pub fn x_axis(&self) -> &ReferenceableAxis {
        &self.x_axis
    }

    pub fn y_axis(&self) -> &ReferenceableAxis {
        &self.y_axis
    }

    pub fn crs(&self) -> CrsCode {
        self.crs
    }

    pub fn x_size(&self) -> usize {
        self.x_axis.size()
    }

    pub fn y_size(&self) -> usize {
        self.y_axis.size()
    }

    /// Cell for coordinates already in this grid's CRS.
    pub fn find_native(&self, x: f64, y: f64) -> Option<GridIndex> {
        let i = self.x_axis.find_index_of(x)?;
        let j = self.y_axis.find_index_of(y)?;
        Some(GridIndex::new(i, j))
    }

    /// Cell for a position in this grid's CRS.
    ///
    /// A position in any other CRS is an error; use a projected grid when
    /// positions need transforming.
    pub fn find_index_of(&self, position: &HorizontalPosition) -> Result<Option<GridIndex>> {
        if position.crs != self.crs {
            return Err(ProjectionError::UnsupportedCrs(position.crs).into());
        }
        Ok(self.find_native(position.x, position.y))
    }

    pub fn cell_centre(&self, index: GridIndex) -> HorizontalPosition {
        HorizontalPosition::new(
            self.x_axis.coordinate_value(index.i),
            self.y_axis.coordinate_value(index.j),
            self.crs,
        )
    }

    /// Corners of cell `index` from the axis bounds, counter-clockwise from
    /// the low x, low y corner.
    pub fn cell_footprint(&self, index: GridIndex) -> Vec<HorizontalPosition> {
        let x = self.x_axis.coordinate_bounds(index.i);
        let y = self.y_axis.coordinate_bounds(index.j);
        [(x.low, y.low), (x.high, y.low), (x.high, y.high), (x.low, y.high)]
            .into_iter()
            .map(|(cx, cy)| HorizontalPosition::new(cx, cy, self.crs))
            .collect()
    }
}

/// A rectilinear grid in a native CRS, reached through a transform service.
///
/// Transform calls are serialised per projection by the service.
#[derive(Debug, Clone)]
pub struct ProjectedGrid {
    grid: RectilinearGrid,
    transforms: Arc<TransformService>,
}

impl ProjectedGrid {
    pub fn new(
        x_axis: ReferenceableAxis,
        y_axis: ReferenceableAxis,
        crs: CrsCode,
        transforms: Arc<TransformService>,
    ) -> Result<Self> {
        if !transforms.supports(crs) {
            return Err(ProjectionError::UnsupportedCrs(crs).into());
        }
        Ok(Self {
            grid: RectilinearGrid::new(x_axis, y_axis, crs)?,
            transforms,
        })
    }

    pub fn rectilinear(&self) -> &RectilinearGrid {
        &self.grid
    }

    pub fn crs(&self) -> CrsCode {
        self.grid.crs()
    }

    /// Cell for a position in any CRS the transform service knows.
    pub fn find_index_of(&self, position: &HorizontalPosition) -> Result<Option<GridIndex>> {
        let Some(native) = self.transforms.transform(position, self.grid.crs())? else {
            return Ok(None);
        };
        Ok(self.grid.find_native(native.x, native.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::LambertConformal;

    #[test]
    fn test_rectilinear_lookup() {
        let grid = RectilinearGrid::new(
            ReferenceableAxis::regular("lon", -180.0, 1.0, 360, true).unwrap(),
            ReferenceableAxis::regular("lat", -90.0, 1.0, 181, false).unwrap(),
            CrsCode::Epsg4326,
        )
        .unwrap();

        let pos = HorizontalPosition::lon_lat(200.2, 45.4);
        assert_eq!(grid.find_index_of(&pos).unwrap(), Some(GridIndex::new(20, 135)));
        let outside = HorizontalPosition::lon_lat(0.0, 91.0);
        assert_eq!(grid.find_index_of(&outside).unwrap(), None);

        let merc = HorizontalPosition::new(0.0, 0.0, CrsCode::Epsg3857);
        assert!(grid.find_index_of(&merc).is_err());
    }

    #[test]
    fn test_invalid_axes() {
        let lon = ReferenceableAxis::regular("lon", 0.0, 1.0, 10, true).unwrap();
        let lat = ReferenceableAxis::regular("lat", 0.0, 1.0, 10, false).unwrap();
        assert!(RectilinearGrid::new(lat.clone(), lon.clone(), CrsCode::Epsg4326).is_err());
        assert!(RectilinearGrid::new(lon, lat, CrsCode::Epsg3857).is_err());
    }

    #[test]
    fn test_projected_lookup() {
        let hrrr = LambertConformal::hrrr();
        let crs = projection::Projection::crs(&hrrr);
        let service = Arc::new(TransformService::new().with_projection(hrrr));

        let grid = ProjectedGrid::new(
            ReferenceableAxis::regular("x", 0.0, 3000.0, 1799, false).unwrap(),
            ReferenceableAxis::regular("y", 0.0, 3000.0, 1059, false).unwrap(),
            crs,
            service,
        )
        .unwrap();

        // First grid point
        let first = HorizontalPosition::lon_lat(-122.719528, 21.138123);
        assert_eq!(grid.find_index_of(&first).unwrap(), Some(GridIndex::new(0, 0)));

        // Kansas City lands mid-grid
        let kc = HorizontalPosition::lon_lat(-94.5, 39.0);
        let index = grid.find_index_of(&kc).unwrap().unwrap();
        assert!(index.i > 700 && index.i < 1100);
        assert!(index.j > 400 && index.j < 700);

        // Europe is outside CONUS
        let paris = HorizontalPosition::lon_lat(2.35, 48.85);
        assert_eq!(grid.find_index_of(&paris).unwrap(), None);
    }
}
