//! Coarse raster index over a curvilinear grid.
//!
//! Each bucket of a regular lon/lat raster stores the `(i, j)` of a cell
//! whose footprint covers the bucket position. The table only seeds the
//! cell search; containment is confirmed against the cell itself.

use super::coords::{near_polygon_edge, polygon_contains, Cell, CurvilinearCoords};
use crate::error::{GridError, Result};
use crate::types::GridIndex;
use geo_common::{constrain_longitude_180, BoundingBox};
use nalgebra::{Affine2, Matrix3, Point2};
use std::time::Instant;

/// Pre-computed seed cells for a curvilinear grid.
#[derive(Debug, Clone)]
pub struct LookupTable {
    n_lon: usize,
    n_lat: usize,
    extent: BoundingBox,
    lon_stride: f64,
    lat_stride: f64,
    /// Maps lon/lat to fractional bucket coordinates
    to_index: Affine2<f64>,
    /// Cell indices per bucket, row-major by latitude
    indices: Vec<(u32, u32)>,
    /// Bit N is 1 if bucket N holds a cell
    valid_bitmap: Vec<u64>,
}

impl LookupTable {
    /// Rasterise `coords` at `resolution` degrees per bucket.
    ///
    /// Both raster dimensions shrink by 10% at a time until the bucket count
    /// is within `max_buckets`.
    pub fn build(coords: &CurvilinearCoords, resolution: f64, max_buckets: u64) -> Result<Self> {
        let start = Instant::now();

        let extent = coords
            .corner_bounding_box()
            .ok_or_else(|| GridError::invalid_grid("no cell has four finite corners"))?;
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(GridError::invalid_grid(format!(
                "lookup table resolution must be positive, got {}",
                resolution
            )));
        }
        if coords.ni() > u32::MAX as usize || coords.nj() > u32::MAX as usize {
            return Err(GridError::IndexOverflow {
                value: coords.ni().max(coords.nj()) as u64,
                bits: 32,
            });
        }

        let lon_diff = extent.width();
        let lat_diff = extent.height();
        let mut n_lon = ((lon_diff / resolution).ceil() as usize).max(2);
        let mut n_lat = ((lat_diff / resolution).ceil() as usize).max(2);

        if (n_lon as u64).saturating_mul(n_lat as u64) > max_buckets {
            let requested = (n_lon, n_lat);
            while (n_lon as u64).saturating_mul(n_lat as u64) > max_buckets {
                n_lon = (n_lon as f64 * 0.9) as usize;
                n_lat = (n_lat as f64 * 0.9) as usize;
            }
            tracing::warn!(
                requested_lon = requested.0,
                requested_lat = requested.1,
                n_lon,
                n_lat,
                max_buckets,
                "Lookup table shrunk to fit bucket budget"
            );
        }
        if n_lon < 2 || n_lat < 2 {
            return Err(GridError::invalid_grid(format!(
                "lookup table dimensions must be at least 2 x 2, got {} x {}",
                n_lon, n_lat
            )));
        }

        let lon_stride = lon_diff / (n_lon - 1) as f64;
        let lat_stride = lat_diff / (n_lat - 1) as f64;
        if lon_stride <= 0.0 || lat_stride <= 0.0 {
            return Err(GridError::invalid_grid(format!(
                "degenerate coordinate extent {:?}",
                extent
            )));
        }

        // Scale by the inverse stride after translating by the minimum
        let to_index = Affine2::from_matrix_unchecked(Matrix3::new(
            1.0 / lon_stride,
            0.0,
            -extent.min_x / lon_stride,
            0.0,
            1.0 / lat_stride,
            -extent.min_y / lat_stride,
            0.0,
            0.0,
            1.0,
        ));

        let buckets = n_lon * n_lat;
        let mut lut = Self {
            n_lon,
            n_lat,
            extent,
            lon_stride,
            lat_stride,
            to_index,
            indices: vec![(0, 0); buckets],
            valid_bitmap: vec![0u64; buckets.div_ceil(64)],
        };

        for cell in coords.cells() {
            let corners = cell.corners();
            if corners.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                continue;
            }
            lut.paint(&cell, &corners);

            // Second copy so that grids crossing the antimeridian are found
            // from either side
            let shift = if cell.centre().x > 0.0 { -360.0 } else { 360.0 };
            let shifted = corners.map(|p| Point2::new(p.x + shift, p.y));
            lut.paint(&cell, &shifted);
        }

        tracing::info!(
            n_lon,
            n_lat,
            valid = lut.valid_count(),
            ni = coords.ni(),
            nj = coords.nj(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built curvilinear lookup table"
        );

        Ok(lut)
    }

    /// Fill the buckets covered by one cell footprint.
    ///
    /// Buckets inside the polygon are overwritten. Buckets on an edge, within
    /// a rounding tolerance, are only taken when still empty, so the outer
    /// boundary of the grid is covered without leaking past it.
    fn paint(&mut self, cell: &Cell<'_>, polygon: &[Point2<f64>; 4]) {
        let Some(mbr) = BoundingBox::enclosing(polygon.iter().map(|p| (p.x, p.y))) else {
            return;
        };
        if !mbr.intersects(&self.extent) {
            return;
        }

        const EDGE_EPS: f64 = 1e-9;
        let low = self.to_index.transform_point(&Point2::new(mbr.min_x, mbr.min_y));
        let high = self.to_index.transform_point(&Point2::new(mbr.max_x, mbr.max_y));
        let a0 = (low.x - EDGE_EPS).ceil().max(0.0) as usize;
        let b0 = (low.y - EDGE_EPS).ceil().max(0.0) as usize;
        let a1 = ((high.x + EDGE_EPS).floor() as i64).min(self.n_lon as i64 - 1);
        let b1 = ((high.y + EDGE_EPS).floor() as i64).min(self.n_lat as i64 - 1);
        if a1 < 0 || b1 < 0 {
            return;
        }

        // Indices were checked to fit u32 at build time
        let (ci, cj) = (cell.i() as u32, cell.j() as u32);
        let edge_tolerance = EDGE_EPS * self.lon_stride.max(self.lat_stride);
        for b in b0..=b1 as usize {
            let lat = self.extent.min_y + b as f64 * self.lat_stride;
            for a in a0..=a1 as usize {
                let lon = self.extent.min_x + a as f64 * self.lon_stride;
                let bucket = b * self.n_lon + a;
                let position = Point2::new(lon, lat);
                if polygon_contains(polygon, position)
                    || (!self.is_valid(bucket)
                        && near_polygon_edge(polygon, position, edge_tolerance))
                {
                    self.set(bucket, ci, cj);
                }
            }
        }
    }

    #[inline]
    fn is_valid(&self, bucket: usize) -> bool {
        (self.valid_bitmap[bucket / 64] & (1u64 << (bucket % 64))) != 0
    }

    #[inline]
    fn set(&mut self, bucket: usize, i: u32, j: u32) {
        self.indices[bucket] = (i, j);
        self.valid_bitmap[bucket / 64] |= 1u64 << (bucket % 64);
    }

    /// Seed cell for a lon/lat position, or `None` outside the raster or on
    /// an empty bucket.
    pub fn get(&self, lon: f64, lat: f64) -> Option<GridIndex> {
        if lon.is_nan() || lat.is_nan() {
            return None;
        }
        let mut lon = constrain_longitude_180(lon);
        if !self.extent.contains_point(lon, lat) {
            // The raster may extend past the antimeridian
            lon += if lon > 0.0 { -360.0 } else { 360.0 };
            if !self.extent.contains_point(lon, lat) {
                return None;
            }
        }

        let p = self.to_index.transform_point(&Point2::new(lon, lat));
        let a = (p.x + 0.5).floor();
        let b = (p.y + 0.5).floor();
        if a < 0.0 || b < 0.0 || a >= self.n_lon as f64 || b >= self.n_lat as f64 {
            return None;
        }

        let bucket = b as usize * self.n_lon + a as usize;
        if !self.is_valid(bucket) {
            return None;
        }
        let (i, j) = self.indices[bucket];
        Some(GridIndex::new(i as usize, j as usize))
    }

    /// Raster size as (longitude buckets, latitude buckets).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.n_lon, self.n_lat)
    }

    /// Lon/lat region covered by the raster.
    pub fn extent(&self) -> BoundingBox {
        self.extent
    }

    /// Count buckets holding a cell.
    pub fn valid_count(&self) -> usize {
        self.valid_bitmap
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum()
    }
}
