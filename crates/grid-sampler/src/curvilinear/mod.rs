//! Curvilinear grids: explicit cell coordinates, the lookup-table index and
//! its cache.

mod cache;
mod coords;
mod grid;
mod lut;

pub use cache::LookupTableCache;
pub use coords::{Cell, CurvilinearCoords};
pub(crate) use coords::polygon_contains;
pub use grid::LookupTableGrid;
pub use lut::LookupTable;
