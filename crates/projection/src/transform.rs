//! Serialized CRS transformations.
//!
//! [`Projection`] implementations may cache intermediate state and take
//! `&mut self`, so they are not safe to call concurrently. The
//! [`TransformService`] owns each projection behind its own mutex and routes
//! every conversion through WGS84 lon/lat.

use crate::error::{ProjectionError, Result};
use crate::mercator::WebMercator;
use geo_common::{CrsCode, HorizontalPosition};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A map projection between WGS84 lon/lat degrees and a native CRS.
pub trait Projection: Send {
    /// The CRS of projected coordinates.
    fn crs(&self) -> CrsCode;

    /// Convert lon/lat degrees to native coordinates.
    ///
    /// Returns `None` where the projection is undefined.
    fn project(&mut self, lon: f64, lat: f64) -> Option<(f64, f64)>;

    /// Convert native coordinates to lon/lat degrees.
    fn unproject(&mut self, x: f64, y: f64) -> Option<(f64, f64)>;
}

/// Geographic CRS treated as coincident with WGS84 (e.g. NAD83).
#[derive(Debug, Clone)]
pub struct Geographic {
    crs: CrsCode,
}

impl Geographic {
    pub fn new(crs: CrsCode) -> Self {
        Self { crs }
    }
}

impl Projection for Geographic {
    fn crs(&self) -> CrsCode {
        self.crs
    }

    fn project(&mut self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        Some((lon, lat))
    }

    fn unproject(&mut self, x: f64, y: f64) -> Option<(f64, f64)> {
        Some((x, y))
    }
}

type SharedProjection = Arc<Mutex<Box<dyn Projection>>>;

/// Registry of projections keyed by CRS code.
pub struct TransformService {
    projections: HashMap<CrsCode, SharedProjection>,
}

impl std::fmt::Debug for TransformService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut codes: Vec<String> = self.projections.keys().map(|c| c.to_string()).collect();
        codes.sort();
        f.debug_struct("TransformService")
            .field("projections", &codes)
            .finish()
    }
}

impl Default for TransformService {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformService {
    /// Service with Web Mercator and NAD83 registered.
    pub fn new() -> Self {
        let mut service = Self {
            projections: HashMap::new(),
        };
        service.register(Box::new(WebMercator::new()));
        service.register(Box::new(Geographic::new(CrsCode::Epsg4269)));
        service
    }

    /// Add a projection, replacing any previous one for the same CRS.
    pub fn register(&mut self, projection: Box<dyn Projection>) {
        let crs = projection.crs();
        tracing::debug!(crs = %crs, "Registered projection");
        self.projections.insert(crs, Arc::new(Mutex::new(projection)));
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with_projection<P: Projection + 'static>(mut self, projection: P) -> Self {
        self.register(Box::new(projection));
        self
    }

    /// Whether positions in `crs` can be transformed.
    pub fn supports(&self, crs: CrsCode) -> bool {
        crs.is_wgs84_lonlat() || self.projections.contains_key(&crs)
    }

    /// True when converting between the two CRS leaves coordinates unchanged.
    pub fn is_identity(&self, source: CrsCode, target: CrsCode) -> bool {
        source == target
    }

    /// Transform a position into `target`.
    ///
    /// Returns `Ok(None)` when the position has a NaN coordinate or falls
    /// where one of the projections is undefined.
    pub fn transform(
        &self,
        position: &HorizontalPosition,
        target: CrsCode,
    ) -> Result<Option<HorizontalPosition>> {
        if self.is_identity(position.crs, target) {
            return Ok(Some(HorizontalPosition::new(position.x, position.y, target)));
        }
        if position.is_missing() {
            return Ok(None);
        }

        let lon_lat = if position.crs.is_wgs84_lonlat() {
            Some((position.x, position.y))
        } else {
            let projection = self.lookup(position.crs)?;
            let mut guard = projection
                .lock()
                .map_err(|_| ProjectionError::LockPoisoned(position.crs))?;
            guard.unproject(position.x, position.y)
        };
        let Some((lon, lat)) = lon_lat else {
            return Ok(None);
        };

        if target.is_wgs84_lonlat() {
            return Ok(Some(HorizontalPosition::lon_lat(lon, lat)));
        }

        let projection = self.lookup(target)?;
        let mut guard = projection
            .lock()
            .map_err(|_| ProjectionError::LockPoisoned(target))?;
        Ok(guard
            .project(lon, lat)
            .map(|(x, y)| HorizontalPosition::new(x, y, target)))
    }

    /// Transform a position into WGS84 lon/lat.
    pub fn to_wgs84(&self, position: &HorizontalPosition) -> Result<Option<HorizontalPosition>> {
        self.transform(position, CrsCode::Epsg4326)
    }

    fn lookup(&self, crs: CrsCode) -> Result<&SharedProjection> {
        self.projections
            .get(&crs)
            .ok_or(ProjectionError::UnsupportedCrs(crs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lambert::LambertConformal;

    #[test]
    fn test_identity_keeps_coordinates() {
        let service = TransformService::new();
        let pos = HorizontalPosition::new(1234.5, -42.0, CrsCode::Epsg3857);
        let out = service.transform(&pos, CrsCode::Epsg3857).unwrap().unwrap();
        assert_eq!(out, pos);
        assert!(service.is_identity(CrsCode::Epsg4326, CrsCode::Epsg4326));
        assert!(!service.is_identity(CrsCode::Epsg4326, CrsCode::Epsg3857));
    }

    #[test]
    fn test_mercator_roundtrip_through_service() {
        let service = TransformService::new();
        let pos = HorizontalPosition::lon_lat(-97.5, 38.5);
        let merc = service.transform(&pos, CrsCode::Epsg3857).unwrap().unwrap();
        assert_eq!(merc.crs, CrsCode::Epsg3857);

        let back = service.to_wgs84(&merc).unwrap().unwrap();
        assert!((back.x + 97.5).abs() < 1e-9);
        assert!((back.y - 38.5).abs() < 1e-9);
    }

    #[test]
    fn test_projected_to_projected() {
        let hrrr = LambertConformal::hrrr();
        let hrrr_crs = hrrr.crs();
        let service = TransformService::new().with_projection(hrrr);

        let pos = HorizontalPosition::lon_lat(-94.5, 39.0);
        let lcc = service.transform(&pos, hrrr_crs).unwrap().unwrap();
        let merc = service.transform(&lcc, CrsCode::Epsg3857).unwrap().unwrap();
        let direct = service.transform(&pos, CrsCode::Epsg3857).unwrap().unwrap();

        assert!((merc.x - direct.x).abs() < 1e-3);
        assert!((merc.y - direct.y).abs() < 1e-3);
    }

    #[test]
    fn test_unsupported_crs() {
        let service = TransformService::new();
        let pos = HorizontalPosition::lon_lat(0.0, 0.0);
        let err = service.transform(&pos, CrsCode::Custom(32618)).unwrap_err();
        assert!(matches!(err, ProjectionError::UnsupportedCrs(CrsCode::Custom(32618))));
        assert!(!service.supports(CrsCode::Custom(32618)));
        assert!(service.supports(CrsCode::Epsg4326));
    }

    #[test]
    fn test_missing_and_undefined() {
        let service = TransformService::new();
        let nan = HorizontalPosition::lon_lat(f64::NAN, 0.0);
        assert!(service.transform(&nan, CrsCode::Epsg3857).unwrap().is_none());

        let pole = HorizontalPosition::lon_lat(0.0, 90.0);
        assert!(service.transform(&pole, CrsCode::Epsg3857).unwrap().is_none());
    }
}
