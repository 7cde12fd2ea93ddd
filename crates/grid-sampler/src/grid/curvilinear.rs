//! Horizontal grid backed by explicit cell coordinates.

use crate::curvilinear::{CurvilinearCoords, LookupTableCache, LookupTableGrid};
use crate::error::Result;
use crate::types::GridIndex;
use geo_common::HorizontalPosition;
use projection::{ProjectionError, TransformService};
use std::sync::Arc;

/// A curvilinear grid located through a cached lookup table.
#[derive(Debug, Clone)]
pub struct CurvilinearGrid {
    inner: Arc<LookupTableGrid>,
    transforms: Option<Arc<TransformService>>,
}

impl CurvilinearGrid {
    /// Fetch or build the lookup table for `coords` through `cache`.
    pub fn new(coords: CurvilinearCoords, cache: &LookupTableCache) -> Result<Self> {
        Ok(Self {
            inner: cache.get_or_build(coords)?,
            transforms: None,
        })
    }

    /// Accept positions in other CRS by converting them to WGS84 first.
    pub fn with_transforms(mut self, transforms: Arc<TransformService>) -> Self {
        self.transforms = Some(transforms);
        self
    }

    pub fn lookup_grid(&self) -> &Arc<LookupTableGrid> {
        &self.inner
    }

    pub fn coords(&self) -> &CurvilinearCoords {
        self.inner.coords()
    }

    pub fn find_index_of(&self, position: &HorizontalPosition) -> Result<Option<GridIndex>> {
        if position.crs.is_wgs84_lonlat() {
            return Ok(self.inner.find_index_of(position.x, position.y));
        }
        let transforms = self
            .transforms
            .as_ref()
            .ok_or(ProjectionError::UnsupportedCrs(position.crs))?;
        Ok(transforms
            .to_wgs84(position)?
            .and_then(|p| self.inner.find_index_of(p.x, p.y)))
    }

    pub fn cell_centre(&self, index: GridIndex) -> HorizontalPosition {
        let centre = self.coords().centre(index.i, index.j);
        HorizontalPosition::lon_lat(centre.x, centre.y)
    }
}
