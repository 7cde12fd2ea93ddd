//! Curvilinear cell search seeded by a lookup table.

use super::coords::{Cell, CurvilinearCoords};
use super::lut::LookupTable;
use crate::config::LookupTableConfig;
use crate::error::Result;
use crate::types::GridIndex;
use std::collections::HashSet;
use std::sync::Arc;

/// A curvilinear grid paired with its lookup table.
#[derive(Debug)]
pub struct LookupTableGrid {
    coords: Arc<CurvilinearCoords>,
    lut: LookupTable,
    max_search_iterations: usize,
}

impl LookupTableGrid {
    /// Build the lookup table for `coords`.
    ///
    /// Prefer [`LookupTableCache::get_or_build`](super::LookupTableCache::get_or_build),
    /// which reuses tables for identical coordinates.
    pub fn build(coords: Arc<CurvilinearCoords>, config: &LookupTableConfig) -> Result<Self> {
        let resolution = coords.mean_cell_area().sqrt() / config.resolution_divisor;
        let lut = LookupTable::build(&coords, resolution, config.max_buckets)?;
        Ok(Self {
            coords,
            lut,
            max_search_iterations: config.max_search_iterations,
        })
    }

    pub fn coords(&self) -> &Arc<CurvilinearCoords> {
        &self.coords
    }

    pub fn lookup_table(&self) -> &LookupTable {
        &self.lut
    }

    pub fn x_size(&self) -> usize {
        self.coords.ni()
    }

    pub fn y_size(&self) -> usize {
        self.coords.nj()
    }

    /// Cell holding the WGS84 lon/lat position.
    ///
    /// Returns `None` if the lookup table has no seed for the position.
    /// Otherwise the seed is refined by walking to strictly closer
    /// neighbours. If no nearby footprint contains the point, the closest
    /// cell found is returned.
    pub fn find_index_of(&self, lon: f64, lat: f64) -> Option<GridIndex> {
        let seed = self.lut.get(lon, lat)?;
        let mut cell = self.coords.cell(seed.i, seed.j)?;
        if cell.contains(lon, lat) {
            return Some(cell.index());
        }

        let mut examined: HashSet<Cell<'_>> = HashSet::new();
        examined.insert(cell);
        let mut shortest = cell.distance_sq(lon, lat);

        let mut found = true;
        let mut iterations = 0;
        while found && iterations < self.max_search_iterations {
            found = false;
            for neighbour in cell.neighbours() {
                if examined.insert(neighbour) {
                    let distance = neighbour.distance_sq(lon, lat);
                    if distance < shortest {
                        cell = neighbour;
                        shortest = distance;
                        found = true;
                    }
                }
            }
            iterations += 1;
        }

        if iterations == self.max_search_iterations && found {
            tracing::debug!(
                lon,
                lat,
                iterations,
                "Cell search hit iteration cap, using best candidate"
            );
        }

        if cell.contains(lon, lat) {
            return Some(cell.index());
        }
        if let Some(neighbour) = cell.neighbours().into_iter().find(|n| n.contains(lon, lat)) {
            return Some(neighbour.index());
        }
        Some(cell.index())
    }
}
