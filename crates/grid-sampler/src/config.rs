//! Configuration for extraction and curvilinear lookup.

use crate::reading::DataReadingStrategy;
use serde::{Deserialize, Serialize};

/// Configuration for value extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Strategy for local, uncompressed sources.
    pub local_strategy: DataReadingStrategy,

    /// Strategy for remote or compressed sources.
    pub remote_strategy: DataReadingStrategy,

    /// Curvilinear lookup-table tuning.
    pub lookup_table: LookupTableConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            local_strategy: DataReadingStrategy::PixelByPixel,
            remote_strategy: DataReadingStrategy::BoundingBox,
            lookup_table: LookupTableConfig::default(),
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_LOCAL_STRATEGY") {
            match DataReadingStrategy::from_str(&val) {
                Some(strategy) => config.local_strategy = strategy,
                None => tracing::warn!(value = %val, "Ignoring unknown GRID_LOCAL_STRATEGY"),
            }
        }

        if let Ok(val) = std::env::var("GRID_REMOTE_STRATEGY") {
            match DataReadingStrategy::from_str(&val) {
                Some(strategy) => config.remote_strategy = strategy,
                None => tracing::warn!(value = %val, "Ignoring unknown GRID_REMOTE_STRATEGY"),
            }
        }

        config.lookup_table = LookupTableConfig::from_env();
        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.lookup_table.validate()
    }
}

/// Tuning for curvilinear lookup tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupTableConfig {
    /// Raster resolution is `sqrt(mean cell area) / resolution_divisor`.
    pub resolution_divisor: f64,

    /// Upper limit on raster buckets (longitude x latitude).
    pub max_buckets: u64,

    /// Cap on gradient-descent steps when refining a seed cell.
    pub max_search_iterations: usize,
}

impl Default for LookupTableConfig {
    fn default() -> Self {
        Self {
            resolution_divisor: 3.0,
            max_buckets: 50_000_000,
            max_search_iterations: 100,
        }
    }
}

impl LookupTableConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("LUT_RESOLUTION_DIVISOR") {
            if let Ok(divisor) = val.parse() {
                config.resolution_divisor = divisor;
            }
        }

        if let Ok(val) = std::env::var("LUT_MAX_BUCKETS") {
            if let Ok(max) = val.parse() {
                config.max_buckets = max;
            }
        }

        if let Ok(val) = std::env::var("LUT_MAX_SEARCH_ITERATIONS") {
            if let Ok(iterations) = val.parse() {
                config.max_search_iterations = iterations;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.resolution_divisor.is_finite() && self.resolution_divisor > 0.0) {
            return Err("resolution_divisor must be a positive number".to_string());
        }

        if self.max_buckets < 4 {
            return Err("max_buckets must be >= 4".to_string());
        }

        if self.max_search_iterations == 0 {
            return Err("max_search_iterations must be > 0".to_string());
        }

        Ok(())
    }
}
