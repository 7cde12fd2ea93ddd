//! A variable held entirely in memory.

use super::ranges::RangesList;
use super::variable::{DataBlock, DimensionLayout, GridVariable, SourceKind, ValueDecoder};
use crate::error::{GridError, Result};
use std::sync::atomic::{AtomicU64, Ordering};

/// Row-major array in memory that counts the reads made against it.
#[derive(Debug)]
pub struct InMemoryVariable {
    name: String,
    shape: Vec<usize>,
    values: Vec<f64>,
    layout: DimensionLayout,
    decoder: ValueDecoder,
    source_kind: SourceKind,
    reads: AtomicU64,
}

impl InMemoryVariable {
    pub fn new(
        name: impl Into<String>,
        shape: Vec<usize>,
        values: Vec<f64>,
        layout: DimensionLayout,
    ) -> Result<Self> {
        let name = name.into();
        if layout.rank != shape.len() {
            return Err(GridError::invalid_metadata(format!(
                "variable '{}' has rank {} but layout has rank {}",
                name,
                shape.len(),
                layout.rank
            )));
        }
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(GridError::invalid_metadata(format!(
                "variable '{}' of shape {:?} needs {} values, got {}",
                name,
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self {
            name,
            shape,
            values,
            layout,
            decoder: ValueDecoder::default(),
            source_kind: SourceKind::local_uncompressed(),
            reads: AtomicU64::new(0),
        })
    }

    /// A `[y, x]` variable.
    pub fn from_2d(name: impl Into<String>, ny: usize, nx: usize, values: Vec<f64>) -> Result<Self> {
        Self::new(name, vec![ny, nx], values, DimensionLayout::from_rank(2)?)
    }

    pub fn with_decoder(mut self, decoder: ValueDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_source_kind(mut self, source_kind: SourceKind) -> Self {
        self.source_kind = source_kind;
        self
    }

    /// Number of [`read`](GridVariable::read) calls so far.
    pub fn read_count(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn reset_read_count(&self) {
        self.reads.store(0, Ordering::Relaxed);
    }
}

impl GridVariable for InMemoryVariable {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> &DimensionLayout {
        &self.layout
    }

    fn decoder(&self) -> &ValueDecoder {
        &self.decoder
    }

    fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    fn read(&self, ranges: &RangesList) -> Result<DataBlock> {
        ranges.validate(&self.shape)?;
        self.reads.fetch_add(1, Ordering::Relaxed);

        let start = ranges.start();
        let block_shape = ranges.shape();
        let rank = self.shape.len();

        let mut strides = vec![1usize; rank];
        for d in (0..rank.saturating_sub(1)).rev() {
            strides[d] = strides[d + 1] * self.shape[d + 1];
        }

        // Odometer over the block, last dimension fastest
        let mut values = Vec::with_capacity(ranges.len());
        let mut cursor = vec![0usize; rank];
        'outer: loop {
            let offset: usize = (0..rank).map(|d| (start[d] + cursor[d]) * strides[d]).sum();
            values.push(self.values[offset]);

            for d in (0..rank).rev() {
                cursor[d] += 1;
                if cursor[d] < block_shape[d] {
                    continue 'outer;
                }
                cursor[d] = 0;
            }
            break;
        }

        DataBlock::new(block_shape, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(ny: usize, nx: usize) -> InMemoryVariable {
        let values = (0..ny * nx).map(|k| k as f64).collect();
        InMemoryVariable::from_2d("field", ny, nx, values).unwrap()
    }

    #[test]
    fn test_read_block() {
        let var = field(4, 5);
        let mut ranges = RangesList::new(*var.layout());
        ranges.set_y_range(1, 2);
        ranges.set_x_range(2, 4);

        let block = var.read(&ranges).unwrap();
        assert_eq!(block.shape, vec![2, 3]);
        assert_eq!(block.values, vec![7.0, 8.0, 9.0, 12.0, 13.0, 14.0]);
        assert_eq!(var.read_count(), 1);
    }

    #[test]
    fn test_read_4d() {
        // [t, z, y, x] = [2, 3, 2, 2], value = 1000t + 100z + 10y + x
        let mut values = Vec::new();
        for t in 0..2 {
            for z in 0..3 {
                for y in 0..2 {
                    for x in 0..2 {
                        values.push((1000 * t + 100 * z + 10 * y + x) as f64);
                    }
                }
            }
        }
        let layout = DimensionLayout::from_rank(4).unwrap();
        let var = InMemoryVariable::new("v", vec![2, 3, 2, 2], values, layout).unwrap();

        let mut ranges = RangesList::new(layout);
        ranges.set_t_range(1, 1);
        ranges.set_z_range(2, 2);
        ranges.set_y_range(0, 1);
        ranges.set_x_range(1, 1);
        let block = var.read(&ranges).unwrap();
        assert_eq!(block.values, vec![1201.0, 1211.0]);
    }

    #[test]
    fn test_out_of_bounds_read_fails() {
        let var = field(2, 2);
        let mut ranges = RangesList::new(*var.layout());
        ranges.set_x_range(0, 2);
        assert!(matches!(var.read(&ranges), Err(GridError::InvalidRange(_))));
        assert_eq!(var.read_count(), 0);
    }

    #[test]
    fn test_shape_mismatch() {
        assert!(InMemoryVariable::from_2d("bad", 2, 2, vec![0.0; 3]).is_err());
        let layout = DimensionLayout::from_rank(3).unwrap();
        assert!(InMemoryVariable::new("bad", vec![2, 2], vec![0.0; 4], layout).is_err());
    }
}
