//! Shared cache of lookup-table grids keyed by coordinate content.
//!
//! Entries are never evicted automatically; call [`LookupTableCache::clear`]
//! to drop them.

use super::coords::CurvilinearCoords;
use super::grid::LookupTableGrid;
use crate::config::{ExtractionConfig, LookupTableConfig};
use crate::error::{GridError, Result};
use crate::types::CacheStats;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Cache of lookup-table grids.
///
/// A single lock covers lookup and construction, so concurrent requests for
/// the same coordinates build the table once.
pub struct LookupTableCache {
    entries: Mutex<HashMap<Arc<CurvilinearCoords>, Arc<LookupTableGrid>>>,
    config: LookupTableConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl LookupTableCache {
    /// Create an empty cache building tables with `config`.
    pub fn new(config: LookupTableConfig) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create an empty cache from the lookup-table section of `config`.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        config.validate().map_err(GridError::ConfigError)?;
        Ok(Self::new(config.lookup_table.clone()))
    }

    pub fn config(&self) -> &LookupTableConfig {
        &self.config
    }

    /// Return the grid for `coords`, building its lookup table on first use.
    pub fn get_or_build(&self, coords: CurvilinearCoords) -> Result<Arc<LookupTableGrid>> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| GridError::CacheError("lookup table cache lock poisoned".to_string()))?;

        if let Some(grid) = entries.get(&coords) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(ni = coords.ni(), nj = coords.nj(), "Lookup table cache hit");
            return Ok(Arc::clone(grid));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(ni = coords.ni(), nj = coords.nj(), "Lookup table cache miss");

        let coords = Arc::new(coords);
        let grid = Arc::new(LookupTableGrid::build(Arc::clone(&coords), &self.config)?);
        entries.insert(coords, Arc::clone(&grid));
        Ok(grid)
    }

    /// Drop every cached table.
    pub fn clear(&self) {
        match self.entries.lock() {
            Ok(mut entries) => entries.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Number of cached tables.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl Default for LookupTableCache {
    fn default() -> Self {
        Self::new(LookupTableConfig::default())
    }
}
