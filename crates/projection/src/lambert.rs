//! Lambert Conformal Conic projection.
//!
//! This projection is commonly used for weather data including HRRR.
//! It maps a cone tangent or secant to the Earth's surface onto a flat plane.
//!
//! Projected coordinates are meters measured from the false origin, which is
//! placed at the first grid point. A model grid in this projection is then a
//! pair of regular axes starting at zero with the model's grid spacing.

use crate::error::{ProjectionError, Result};
use crate::transform::Projection;
use geo_common::{constrain_longitude_180, CrsCode};
use std::f64::consts::PI;

/// Earth radius used by NCEP models (meters).
pub const NCEP_EARTH_RADIUS: f64 = 6371229.0;

/// Private CRS code assigned to the HRRR CONUS grid.
pub const HRRR_CRS_CODE: u32 = 990_001;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone)]
pub struct LambertConformal {
    crs: CrsCode,
    /// Central meridian (LoV) in radians
    lon0: f64,
    /// Latitude of the false origin in radians
    lat1: f64,
    /// Longitude of the false origin in radians
    lon1: f64,
    earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the false origin latitude
    rho0: f64,
    /// Cone-plane position of the false origin, filled on first use
    origin: Option<(f64, f64)>,
}

impl LambertConformal {
    /// Create a projection from GRIB2-style parameters, all in degrees.
    ///
    /// # Arguments
    /// * `crs` - Code under which positions in this projection are tagged
    /// * `lat1_deg`, `lon1_deg` - False origin (first grid point)
    /// * `lov_deg` - Central meridian / orientation of the grid
    /// * `latin1_deg`, `latin2_deg` - Standard parallels (equal for a tangent cone)
    pub fn new(
        crs: CrsCode,
        lat1_deg: f64,
        lon1_deg: f64,
        lov_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
    ) -> Result<Self> {
        let lat1 = lat1_deg.to_radians();
        let lon1 = lon1_deg.to_radians();
        let lon0 = lov_deg.to_radians();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();

        if latin1.cos().abs() < 1e-10 || latin2.cos().abs() < 1e-10 {
            return Err(ProjectionError::InvalidParameters(format!(
                "standard parallels {} / {} must not be poles",
                latin1_deg, latin2_deg
            )));
        }

        let n = if (latin1 - latin2).abs() < 1e-10 {
            latin1.sin()
        } else {
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };
        if !n.is_finite() || n.abs() < 1e-10 {
            return Err(ProjectionError::InvalidParameters(format!(
                "degenerate cone constant for parallels {} / {}",
                latin1_deg, latin2_deg
            )));
        }

        Ok(Self::with_cone_constant(crs, lat1, lon1, lon0, latin1, n))
    }

    fn with_cone_constant(crs: CrsCode, lat1: f64, lon1: f64, lon0: f64, latin1: f64, n: f64) -> Self {
        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let earth_radius = NCEP_EARTH_RADIUS;
        let rho0 = earth_radius * f / (PI / 4.0 + lat1 / 2.0).tan().powf(n);

        Self {
            crs,
            lon0,
            lat1,
            lon1,
            earth_radius,
            n,
            f,
            rho0,
            origin: None,
        }
    }

    /// Create HRRR projection with standard parameters.
    ///
    /// HRRR uses Lambert Conformal with:
    /// - First point: 21.138123°N, 237.280472°E (= -122.719528°W)
    /// - LoV: 262.5°E (= -97.5°W)
    /// - Standard parallels: 38.5°N (both)
    /// - Grid: 1799 x 1059, 3km spacing
    pub fn hrrr() -> Self {
        let latin = 38.5_f64.to_radians();
        Self::with_cone_constant(
            CrsCode::Custom(HRRR_CRS_CODE),
            21.138123_f64.to_radians(),
            (-122.719528_f64).to_radians(),
            (-97.5_f64).to_radians(),
            latin,
            latin.sin(),
        )
    }

    fn wrap(mut dlon: f64) -> f64 {
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }
        dlon
    }

    fn rho(&self, lat: f64) -> f64 {
        self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n)
    }

    fn cone_xy(&self, lat: f64, lon: f64) -> (f64, f64) {
        let rho = self.rho(lat);
        let theta = self.n * Self::wrap(lon - self.lon0);
        (rho * theta.sin(), self.rho0 - rho * theta.cos())
    }

    fn origin(&mut self) -> (f64, f64) {
        match self.origin {
            Some(origin) => origin,
            None => {
                let origin = self.cone_xy(self.lat1, self.lon1);
                self.origin = Some(origin);
                origin
            }
        }
    }
}

impl Projection for LambertConformal {
    fn crs(&self) -> CrsCode {
        self.crs
    }

    fn project(&mut self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if !lon.is_finite() || !lat.is_finite() || lat.abs() >= 90.0 {
            return None;
        }
        let (x0, y0) = self.origin();
        let (x, y) = self.cone_xy(lat.to_radians(), lon.to_radians());
        Some((x - x0, y - y0))
    }

    fn unproject(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (x0, y0) = self.origin();
        let x = x + x0;
        let dy = self.rho0 - (y + y0);

        let mut rho = (x * x + dy * dy).sqrt();
        let theta = if self.n < 0.0 {
            rho = -rho;
            (-x).atan2(-dy)
        } else {
            x.atan2(dy)
        };
        if rho == 0.0 {
            return Some((self.lon0.to_degrees(), 90.0_f64.copysign(self.n)));
        }

        let lat = 2.0 * (self.earth_radius * self.f / rho).powf(1.0 / self.n).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        Some((constrain_longitude_180(lon.to_degrees()), lat.to_degrees()))
    }
}
