//! The variable abstraction consumed by reading strategies.
//!
//! A [`GridVariable`] is a multi-dimensional array with two horizontal
//! dimensions and optional time and vertical dimensions in any physical
//! order. Reads return raw (packed) values; [`ValueDecoder`] turns them into
//! physical values.

use super::ranges::RangesList;
use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};

/// Physical positions of the logical t, z, y and x dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionLayout {
    pub rank: usize,
    pub t: Option<usize>,
    pub z: Option<usize>,
    pub y: usize,
    pub x: usize,
}

impl DimensionLayout {
    /// Create a layout, checking positions are distinct and below `rank`.
    pub fn new(rank: usize, t: Option<usize>, z: Option<usize>, y: usize, x: usize) -> Result<Self> {
        let mut used = vec![false; rank];
        for position in [t, z, Some(y), Some(x)].into_iter().flatten() {
            if position >= rank {
                return Err(GridError::invalid_metadata(format!(
                    "dimension position {} out of range for rank {}",
                    position, rank
                )));
            }
            if used[position] {
                return Err(GridError::invalid_metadata(format!(
                    "dimension position {} assigned twice",
                    position
                )));
            }
            used[position] = true;
        }
        Ok(Self { rank, t, z, y, x })
    }

    /// Conventional layouts: `[y, x]`, `[t, y, x]` and `[t, z, y, x]`.
    pub fn from_rank(rank: usize) -> Result<Self> {
        match rank {
            2 => Self::new(2, None, None, 0, 1),
            3 => Self::new(3, Some(0), None, 1, 2),
            4 => Self::new(4, Some(0), Some(1), 2, 3),
            _ => Err(GridError::invalid_metadata(format!(
                "cannot infer dimension layout for rank {}",
                rank
            ))),
        }
    }

    /// Layout from dimension names such as `["time", "lat", "lon"]`.
    ///
    /// Returns `None` when x or y cannot be identified or a name is claimed
    /// twice.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Option<Self> {
        let mut t = None;
        let mut z = None;
        let mut y = None;
        let mut x = None;

        for (position, name) in names.iter().enumerate() {
            let slot = match name.as_ref().to_ascii_lowercase().as_str() {
                "x" | "lon" | "longitude" | "xc" | "rlon" | "ni" => &mut x,
                "y" | "lat" | "latitude" | "yc" | "rlat" | "nj" => &mut y,
                "t" | "time" => &mut t,
                "z" | "lev" | "level" | "depth" | "height" | "altitude" | "isobaric" => &mut z,
                _ => continue,
            };
            if slot.replace(position).is_some() {
                return None;
            }
        }

        Self::new(names.len(), t, z, y?, x?).ok()
    }
}

/// Characteristics of the storage behind a variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceKind {
    /// Served over a network; every read has a fixed round-trip cost.
    pub remote: bool,
    /// Stored in compressed chunks; every read decompresses whole chunks.
    pub compressed: bool,
}

impl SourceKind {
    pub fn local_uncompressed() -> Self {
        Self::default()
    }

    /// True when the cost of a read is dominated by per-call overhead.
    pub fn favours_few_reads(&self) -> bool {
        self.remote || self.compressed
    }
}

/// Conversion from raw stored values to physical values.
///
/// Missing, fill and out-of-range tests apply to the raw value, before
/// scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDecoder {
    pub scale_factor: f64,
    pub add_offset: f64,
    pub missing_value: Option<f64>,
    pub fill_value: Option<f64>,
    pub valid_min: Option<f64>,
    pub valid_max: Option<f64>,
}

impl Default for ValueDecoder {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            add_offset: 0.0,
            missing_value: None,
            fill_value: None,
            valid_min: None,
            valid_max: None,
        }
    }
}

impl ValueDecoder {
    pub fn with_scale_offset(mut self, scale_factor: f64, add_offset: f64) -> Self {
        self.scale_factor = scale_factor;
        self.add_offset = add_offset;
        self
    }

    pub fn with_missing_value(mut self, missing_value: f64) -> Self {
        self.missing_value = Some(missing_value);
        self
    }

    pub fn with_fill_value(mut self, fill_value: f64) -> Self {
        self.fill_value = Some(fill_value);
        self
    }

    pub fn with_valid_range(mut self, valid_min: Option<f64>, valid_max: Option<f64>) -> Self {
        self.valid_min = valid_min;
        self.valid_max = valid_max;
        self
    }

    /// True if `raw` marks an absent value.
    pub fn is_missing(&self, raw: f64) -> bool {
        raw.is_nan()
            || self.missing_value == Some(raw)
            || self.fill_value == Some(raw)
            || self.valid_min.is_some_and(|min| raw < min)
            || self.valid_max.is_some_and(|max| raw > max)
    }

    /// Physical value for `raw`, or NaN when missing.
    #[inline]
    pub fn decode(&self, raw: f64) -> f32 {
        if self.is_missing(raw) {
            return f32::NAN;
        }
        (raw * self.scale_factor + self.add_offset) as f32
    }
}

/// A block of raw values in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBlock {
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

impl DataBlock {
    pub fn new(shape: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(GridError::read_failed(format!(
                "block of shape {:?} needs {} values, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self { shape, values })
    }

    /// Value at a multi-dimensional index, or `None` if out of bounds.
    pub fn get(&self, index: &[usize]) -> Option<f64> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (&k, &n) in index.iter().zip(&self.shape) {
            if k >= n {
                return None;
            }
            offset = offset * n + k;
        }
        self.values.get(offset).copied()
    }
}

/// A multi-dimensional gridded variable.
pub trait GridVariable: Send + Sync {
    fn name(&self) -> &str;

    /// Physical shape, one entry per dimension.
    fn shape(&self) -> &[usize];

    fn layout(&self) -> &DimensionLayout;

    fn decoder(&self) -> &ValueDecoder;

    fn source_kind(&self) -> SourceKind;

    /// Read the block described by `ranges`, raw and undecoded.
    ///
    /// The returned block has one dimension per range, in physical order.
    fn read(&self, ranges: &RangesList) -> Result<DataBlock>;
}
