//! Spherical Web Mercator (EPSG:3857).

use crate::transform::Projection;
use geo_common::CrsCode;

/// WGS84 semi-major axis used by Web Mercator (meters).
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude limit where the projected square ends.
pub const MAX_LATITUDE: f64 = 85.05112877980659;

/// Spherical Mercator as used by web map tiles.
#[derive(Debug, Clone, Default)]
pub struct WebMercator;

impl WebMercator {
    pub fn new() -> Self {
        Self
    }
}

impl Projection for WebMercator {
    fn crs(&self) -> CrsCode {
        CrsCode::Epsg3857
    }

    fn project(&mut self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() > MAX_LATITUDE {
            return None;
        }
        let x = EARTH_RADIUS * lon.to_radians();
        let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
        Some((x, y))
    }

    fn unproject(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let lon = (x / EARTH_RADIUS).to_degrees();
        let lat = (y / EARTH_RADIUS).sinh().atan().to_degrees();
        Some((lon, lat))
    }
}
