//! Coordinate reference system transformations.
//!
//! Spherical Web Mercator and spherical Lambert Conformal Conic.
//! Projection objects keep mutable scratch state, so every transformation
//! runs under the lock owned by [`TransformService`].

pub mod error;
pub mod lambert;
pub mod mercator;
pub mod transform;

pub use error::{ProjectionError, Result};
pub use lambert::LambertConformal;
pub use mercator::WebMercator;
pub use transform::{Geographic, Projection, TransformService};
