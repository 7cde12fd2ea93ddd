//! Horizontal positions tagged with their CRS.

use crate::crs::CrsCode;
use serde::{Deserialize, Serialize};

/// A point in some horizontal CRS.
///
/// For geographic CRS, `x` is longitude and `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalPosition {
    pub x: f64,
    pub y: f64,
    pub crs: CrsCode,
}

impl HorizontalPosition {
    pub fn new(x: f64, y: f64, crs: CrsCode) -> Self {
        Self { x, y, crs }
    }

    /// Position in WGS84 lon/lat degrees.
    pub fn lon_lat(lon: f64, lat: f64) -> Self {
        Self::new(lon, lat, CrsCode::Epsg4326)
    }

    /// True when either coordinate is NaN.
    pub fn is_missing(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}
