//! Common types shared across the grid sampling crates.

pub mod bbox;
pub mod crs;
pub mod longitude;
pub mod position;

pub use bbox::BoundingBox;
pub use crs::{CrsCode, CrsParseError};
pub use longitude::{
    constrain_longitude_180, constrain_longitude_360, nearest_equivalent_longitude,
    next_equivalent_longitude,
};
pub use position::HorizontalPosition;
