//! Source-to-target grid matching and strategy-driven extraction
//!
//! This crate extracts values from a gridded variable at an arbitrary set of
//! target points (a grid, a transect or scattered points). It covers:
//!
//! - **Matching**: find the source cell containing each target point, through
//!   axis arithmetic for rectilinear grids and a lookup table plus local
//!   search for curvilinear grids
//! - **Mapping**: collect matches into a sorted, compressed [`PixelMap`]
//! - **Reading**: turn the map into reads with one of three
//!   [`DataReadingStrategy`] algorithms
//!
//! # Architecture
//!
//! ```text
//! read_values(strategy, variable, t, z, source, target)
//!      │
//!      ▼
//! PixelMap::for_grid / for_list
//!      │
//!      ├─► HorizontalGrid::find_index_of(position) per target point
//!      │         │
//!      │         ├─► Rectilinear: axis arithmetic / binary search
//!      │         │
//!      │         └─► Curvilinear: lookup table seed + gradient descent
//!      │
//!      └─► Sort pairs by source cell
//!               │
//!               ▼
//! DataReadingStrategy::read
//!      │
//!      ├─► PixelByPixel: one read per source cell
//!      ├─► Scanline:     one read per source row
//!      └─► BoundingBox:  one read for everything
//!               │
//!               ▼
//!          Vec<f32> in target order, NaN = no data
//! ```
//!
//! # Example
//!
//! ```ignore
//! use grid_sampler::{read_values, DataReadingStrategy, TargetDomain};
//!
//! let values = read_values(
//!     DataReadingStrategy::Scanline,
//!     &variable,
//!     Some(0),
//!     None,
//!     &source_grid,
//!     &TargetDomain::Grid(target_grid),
//! )?;
//! ```

pub mod axis;
pub mod config;
pub mod curvilinear;
pub mod domain;
pub mod error;
pub mod extract;
pub mod grid;
pub mod pixel_map;
pub mod reading;
pub mod types;

// Re-export commonly used types at crate root
pub use axis::{IrregularAxis, ReferenceableAxis, RegularAxis};
pub use config::{ExtractionConfig, LookupTableConfig};
pub use curvilinear::{Cell, CurvilinearCoords, LookupTable, LookupTableCache, LookupTableGrid};
pub use domain::TargetDomain;
pub use error::{GridError, Result};
pub use extract::{read_values, read_values_with_config};
pub use grid::{
    CurvilinearGrid, HorizontalGrid, ProjectedGrid, RectilinearGrid, StaggerPadding, StaggeredGrid,
};
pub use pixel_map::{CompressedIndexArray, PixelMap, PixelMapEntry, Scanline};
pub use reading::{
    DataBlock, DataReadingStrategy, DimensionLayout, GridVariable, InMemoryVariable, RangesList,
    SourceKind, ValueDecoder, ZarrVariable,
};
pub use types::{CacheStats, Extent, GridIndex, IndexBounds};
