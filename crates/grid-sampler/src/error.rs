//! Error types for grid sampling.
//!
//! A point that cannot be matched to the source grid is not an error; lookups
//! report that case as `None`.

use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while building grids or extracting values.
#[derive(Error, Debug)]
pub enum GridError {
    /// Axis values are malformed (empty, NaN, non-monotonic, bad spacing).
    #[error("invalid axis '{axis}': {message}")]
    InvalidAxis { axis: String, message: String },

    /// Grid construction inputs are inconsistent.
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// The target domain cannot be addressed with 32-bit signed indices.
    #[error("target domain of {size} points exceeds the addressable maximum of {max}")]
    DomainTooLarge { size: u64, max: u64 },

    /// A value does not fit the width chosen for a compressed index array.
    #[error("index {value} exceeds the capacity of a {bits}-bit index array")]
    IndexOverflow { value: u64, bits: u32 },

    /// An index range is empty or lies outside the variable.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Failed to read data from the variable.
    #[error("failed to read grid data: {0}")]
    ReadFailed(String),

    /// Invalid metadata on the variable.
    #[error("invalid grid metadata: {0}")]
    InvalidMetadata(String),

    /// Zarr format error.
    #[error("Zarr format error: {0}")]
    ZarrError(String),

    /// CRS transformation failure.
    #[error("projection error: {0}")]
    Projection(#[from] ProjectionError),

    /// Cache error.
    #[error("cache error: {0}")]
    CacheError(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl GridError {
    /// Create an InvalidAxis error.
    pub fn invalid_axis(axis: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAxis {
            axis: axis.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidGrid error.
    pub fn invalid_grid(msg: impl Into<String>) -> Self {
        Self::InvalidGrid(msg.into())
    }

    /// Create an InvalidRange error.
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Create a ReadFailed error.
    pub fn read_failed(msg: impl Into<String>) -> Self {
        Self::ReadFailed(msg.into())
    }

    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Create a ZarrError.
    pub fn zarr_error(msg: impl Into<String>) -> Self {
        Self::ZarrError(msg.into())
    }
}

/// Result type for grid sampling operations.
pub type Result<T> = std::result::Result<T, GridError>;
