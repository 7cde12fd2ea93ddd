//! Strategies that turn a [`PixelMap`] into reads against a variable.
//!
//! All strategies produce the same output; they differ only in how many
//! reads they issue and how much data each read returns:
//!
//! | strategy | reads | cells read |
//! |---|---|---|
//! | `PixelByPixel` | one per distinct source cell | distinct cells |
//! | `Scanline` | one per source row | sum of row spans |
//! | `BoundingBox` | one | bounding rectangle |

mod memory;
mod ranges;
mod variable;
mod zarr;

pub use memory::InMemoryVariable;
pub use ranges::RangesList;
pub use variable::{DataBlock, DimensionLayout, GridVariable, SourceKind, ValueDecoder};
pub use zarr::ZarrVariable;

use crate::config::ExtractionConfig;
use crate::error::{GridError, Result};
use crate::pixel_map::{PixelMap, PixelMapEntry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Algorithm used to read the source cells named by a pixel map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataReadingStrategy {
    /// One single-cell read per distinct source cell.
    #[default]
    PixelByPixel,
    /// One read per source row spanning the matched cells in that row.
    Scanline,
    /// One read of the rectangle covering every matched cell.
    BoundingBox,
}

impl DataReadingStrategy {
    /// Parse a strategy name, case-insensitively.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pixel_by_pixel" | "pixel" => Some(Self::PixelByPixel),
            "scanline" => Some(Self::Scanline),
            "bounding_box" | "bbox" => Some(Self::BoundingBox),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PixelByPixel => "pixel_by_pixel",
            Self::Scanline => "scanline",
            Self::BoundingBox => "bounding_box",
        }
    }

    /// Strategy for a source: few large reads when each read is expensive.
    pub fn select(source_kind: SourceKind, config: &ExtractionConfig) -> Self {
        if source_kind.favours_few_reads() {
            config.remote_strategy
        } else {
            config.local_strategy
        }
    }

    /// Read every cell in `pixel_map` from `variable` at the given time and
    /// vertical indices.
    ///
    /// Returns one value per target point in target order; points with no
    /// source cell, or whose source value is missing, are NaN. A failed read
    /// aborts the whole call.
    pub fn read(
        &self,
        pixel_map: &PixelMap,
        variable: &dyn GridVariable,
        t_index: Option<usize>,
        z_index: Option<usize>,
    ) -> Result<Vec<f32>> {
        let mut output = vec![f32::NAN; pixel_map.target_domain_size()];
        if pixel_map.is_empty() {
            return Ok(output);
        }

        let mut ranges = RangesList::new(*variable.layout());
        if let Some(t) = t_index {
            ranges.set_t_range(t, t);
        }
        if let Some(z) = z_index {
            ranges.set_z_range(z, z);
        }

        let start = Instant::now();
        let reads = match self {
            Self::PixelByPixel => read_pixel_by_pixel(pixel_map, variable, ranges, &mut output)?,
            Self::Scanline => read_scanlines(pixel_map, variable, ranges, &mut output)?,
            Self::BoundingBox => read_bounding_box(pixel_map, variable, ranges, &mut output)?,
        };

        tracing::debug!(
            strategy = %self,
            variable = variable.name(),
            reads,
            pairs = pixel_map.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Read pixel map values"
        );
        Ok(output)
    }
}

impl fmt::Display for DataReadingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Decode the cell at `index` of `block` and copy it to the entry's targets.
fn fan_out(
    entry: &PixelMapEntry<'_>,
    block: &DataBlock,
    index: &[usize],
    decoder: &ValueDecoder,
    output: &mut [f32],
) -> Result<()> {
    let raw = block.get(index).ok_or_else(|| {
        GridError::read_failed(format!(
            "cell ({}, {}) missing from block of shape {:?}",
            entry.i(),
            entry.j(),
            block.shape
        ))
    })?;
    let value = decoder.decode(raw);
    if !value.is_nan() {
        for target in entry.targets() {
            output[target] = value;
        }
    }
    Ok(())
}

fn read_pixel_by_pixel(
    pixel_map: &PixelMap,
    variable: &dyn GridVariable,
    mut ranges: RangesList,
    output: &mut [f32],
) -> Result<usize> {
    let layout = *variable.layout();
    let origin = vec![0usize; layout.rank];
    let mut reads = 0;

    for entry in pixel_map.entries() {
        ranges.set_y_range(entry.j(), entry.j());
        ranges.set_x_range(entry.i(), entry.i());
        let block = variable.read(&ranges)?;
        reads += 1;
        fan_out(&entry, &block, &origin, variable.decoder(), output)?;
    }
    Ok(reads)
}

fn read_scanlines(
    pixel_map: &PixelMap,
    variable: &dyn GridVariable,
    mut ranges: RangesList,
    output: &mut [f32],
) -> Result<usize> {
    let layout = *variable.layout();
    let mut index = vec![0usize; layout.rank];
    let mut reads = 0;

    for scanline in pixel_map.scanlines() {
        let min_i = scanline.min_i();
        ranges.set_y_range(scanline.j(), scanline.j());
        ranges.set_x_range(min_i, scanline.max_i());
        tracing::trace!(ranges = %ranges, "Reading scanline");
        let block = variable.read(&ranges)?;
        reads += 1;

        for entry in scanline.entries() {
            index[layout.x] = entry.i() - min_i;
            fan_out(entry, &block, &index, variable.decoder(), output)?;
        }
    }
    Ok(reads)
}

fn read_bounding_box(
    pixel_map: &PixelMap,
    variable: &dyn GridVariable,
    mut ranges: RangesList,
    output: &mut [f32],
) -> Result<usize> {
    let Some(bounds) = pixel_map.index_bounds() else {
        return Ok(0);
    };
    let layout = *variable.layout();

    ranges.set_x_range(bounds.min_i, bounds.max_i);
    ranges.set_y_range(bounds.min_j, bounds.max_j);
    tracing::debug!(
        ranges = %ranges,
        cells = bounds.size(),
        "Reading bounding box"
    );
    let block = variable.read(&ranges)?;

    let mut index = vec![0usize; layout.rank];
    for entry in pixel_map.entries() {
        index[layout.y] = entry.j() - bounds.min_j;
        index[layout.x] = entry.i() - bounds.min_i;
        fan_out(&entry, &block, &index, variable.decoder(), output)?;
    }
    Ok(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::ReferenceableAxis;
    use crate::grid::{HorizontalGrid, RectilinearGrid};
    use geo_common::{CrsCode, HorizontalPosition};

    const ALL: [DataReadingStrategy; 3] = [
        DataReadingStrategy::PixelByPixel,
        DataReadingStrategy::Scanline,
        DataReadingStrategy::BoundingBox,
    ];

    fn grid(nx: usize, ny: usize) -> HorizontalGrid {
        RectilinearGrid::new(
            ReferenceableAxis::regular("lon", 0.0, 1.0, nx, true).unwrap(),
            ReferenceableAxis::regular("lat", 0.0, 1.0, ny, false).unwrap(),
            CrsCode::Epsg4326,
        )
        .unwrap()
        .into()
    }

    fn field(nx: usize, ny: usize) -> InMemoryVariable {
        let values = (0..nx * ny).map(|k| (10 * (k / nx) + k % nx) as f64).collect();
        InMemoryVariable::from_2d("v", ny, nx, values).unwrap()
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            DataReadingStrategy::from_str("PIXEL_BY_PIXEL"),
            Some(DataReadingStrategy::PixelByPixel)
        );
        assert_eq!(
            DataReadingStrategy::from_str("pixel"),
            Some(DataReadingStrategy::PixelByPixel)
        );
        assert_eq!(
            DataReadingStrategy::from_str("Scanline"),
            Some(DataReadingStrategy::Scanline)
        );
        assert_eq!(
            DataReadingStrategy::from_str("bbox"),
            Some(DataReadingStrategy::BoundingBox)
        );
        assert_eq!(DataReadingStrategy::from_str("chunked"), None);
        for strategy in ALL {
            assert_eq!(DataReadingStrategy::from_str(strategy.as_str()), Some(strategy));
        }
    }

    #[test]
    fn test_select() {
        let config = ExtractionConfig::default();
        assert_eq!(
            DataReadingStrategy::select(SourceKind::local_uncompressed(), &config),
            DataReadingStrategy::PixelByPixel
        );
        let compressed = SourceKind {
            remote: false,
            compressed: true,
        };
        assert_eq!(
            DataReadingStrategy::select(compressed, &config),
            DataReadingStrategy::BoundingBox
        );
    }

    #[test]
    fn test_read_counts() {
        let source = grid(6, 5);
        let var = field(6, 5);
        let positions = vec![
            HorizontalPosition::lon_lat(1.0, 1.0),
            HorizontalPosition::lon_lat(4.0, 1.0),
            HorizontalPosition::lon_lat(4.0, 1.0),
            HorizontalPosition::lon_lat(2.0, 3.0),
        ];
        let map = PixelMap::for_list(&source, &positions).unwrap();

        let expected_reads = [3, 2, 1];
        for (strategy, expected) in ALL.iter().zip(expected_reads) {
            var.reset_read_count();
            let values = strategy.read(&map, &var, None, None).unwrap();
            assert_eq!(values, vec![11.0, 14.0, 14.0, 32.0], "{}", strategy);
            assert_eq!(var.read_count(), expected, "{}", strategy);
        }
    }

    #[test]
    fn test_empty_map_reads_nothing() {
        let source = grid(4, 3);
        let var = field(4, 3);
        let positions = vec![HorizontalPosition::lon_lat(100.0, 50.0); 3];
        let map = PixelMap::for_list(&source, &positions).unwrap();

        for strategy in ALL {
            let values = strategy.read(&map, &var, None, None).unwrap();
            assert_eq!(values.len(), 3);
            assert!(values.iter().all(|v| v.is_nan()));
        }
        assert_eq!(var.read_count(), 0);
    }

    #[test]
    fn test_missing_values_stay_nan() {
        let source = grid(3, 1);
        let var = InMemoryVariable::from_2d("v", 1, 3, vec![1.0, -999.0, 3.0])
            .unwrap()
            .with_decoder(ValueDecoder::default().with_missing_value(-999.0));
        let map = PixelMap::for_grid(&source, &source).unwrap();

        for strategy in ALL {
            let values = strategy.read(&map, &var, None, None).unwrap();
            assert_eq!(values[0], 1.0);
            assert!(values[1].is_nan());
            assert_eq!(values[2], 3.0);
        }
    }

    #[test]
    fn test_time_and_level_selection() {
        // [t, z, y, x] = [2, 2, 2, 3], value = 100t + 10z + (3y + x)
        let mut values = Vec::new();
        for t in 0..2 {
            for z in 0..2 {
                for k in 0..6 {
                    values.push((100 * t + 10 * z + k) as f64);
                }
            }
        }
        let layout = DimensionLayout::from_rank(4).unwrap();
        let var = InMemoryVariable::new("v", vec![2, 2, 2, 3], values, layout).unwrap();
        let source = grid(3, 2);
        let map = PixelMap::for_grid(&source, &source).unwrap();

        for strategy in ALL {
            let values = strategy.read(&map, &var, Some(1), Some(1)).unwrap();
            assert_eq!(values, vec![110.0, 111.0, 112.0, 113.0, 114.0, 115.0]);
        }
    }

    #[test]
    fn test_read_failure_aborts() {
        let source = grid(4, 3);
        // Variable smaller than the grid it claims to cover
        let var = field(2, 2);
        let map = PixelMap::for_grid(&source, &source).unwrap();

        for strategy in ALL {
            assert!(strategy.read(&map, &var, None, None).is_err());
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DataReadingStrategy::BoundingBox).unwrap();
        assert_eq!(json, "\"bounding_box\"");
        let parsed: DataReadingStrategy = serde_json::from_str("\"scanline\"").unwrap();
        assert_eq!(parsed, DataReadingStrategy::Scanline);
    }
}
