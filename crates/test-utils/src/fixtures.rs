//! Common test fixtures for grid-sampler tests.
//!
//! This module provides pre-defined grid layouts and extents that represent
//! common scenarios when extracting gridded data.

/// Common bounding box definitions for testing, as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Continental United States bounding box
    pub const CONUS: (f64, f64, f64, f64) = (-130.0, 20.0, -60.0, 55.0);
}

/// Common regular lon/lat grid specifications for testing.
pub mod grid {
    /// GFS global grid (0.25 degree resolution, 0 to 359.75 longitude)
    pub const GFS_GLOBAL: GridSpec = GridSpec {
        lon_first: 0.0,
        lon_spacing: 0.25,
        width: 1440,
        lat_first: 90.0,
        lat_spacing: -0.25,
        height: 721,
    };

    /// The 4 x 3 unit grid used by value-order scenarios
    pub const SIMPLE_4X3: GridSpec = GridSpec {
        lon_first: 0.0,
        lon_spacing: 1.0,
        width: 4,
        lat_first: 0.0,
        lat_spacing: 1.0,
        height: 3,
    };

    /// Regular grid specification: first centre, spacing and count per axis.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub lon_first: f64,
        pub lon_spacing: f64,
        pub width: usize,
        pub lat_first: f64,
        pub lat_spacing: f64,
        pub height: usize,
    }

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.width * self.height
        }

        /// Returns the last cell centre as (lon, lat).
        pub fn last_centre(&self) -> (f64, f64) {
            (
                self.lon_first + (self.width - 1) as f64 * self.lon_spacing,
                self.lat_first + (self.height - 1) as f64 * self.lat_spacing,
            )
        }
    }
}
