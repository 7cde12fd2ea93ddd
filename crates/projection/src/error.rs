//! Error types for projection operations.

use geo_common::CrsCode;
use thiserror::Error;

/// Result type alias for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("No projection registered for {0}")]
    UnsupportedCrs(CrsCode),

    #[error("Projection lock poisoned for {0}")]
    LockPoisoned(CrsCode),

    #[error("Invalid projection parameters: {0}")]
    InvalidParameters(String),
}
