//! Zarr V3 arrays as grid variables.

use super::ranges::RangesList;
use super::variable::{DataBlock, DimensionLayout, GridVariable, SourceKind, ValueDecoder};
use crate::error::{GridError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use zarrs::array::{Array, DataType};
use zarrs::array_subset::ArraySubset;
use zarrs::storage::ReadableStorageTraits;

/// A variable backed by a Zarr array.
///
/// Dimension order comes from the `_ARRAY_DIMENSIONS` attribute when present
/// and from rank conventions otherwise. Packing and missing-value attributes
/// follow CF names (`scale_factor`, `add_offset`, `missing_value`,
/// `_FillValue`, `valid_min`, `valid_max`, `valid_range`).
pub struct ZarrVariable<S: ReadableStorageTraits> {
    name: String,
    array: Array<S>,
    shape: Vec<usize>,
    layout: DimensionLayout,
    decoder: ValueDecoder,
    source_kind: SourceKind,
}

impl<S: ReadableStorageTraits + Send + Sync + 'static> ZarrVariable<S> {
    /// Open the array at `path` in `storage`.
    pub fn open(storage: Arc<S>, path: &str) -> Result<Self> {
        let array = Array::open(storage, path).map_err(|e| GridError::zarr_error(e.to_string()))?;

        let name = match path.trim_matches('/') {
            "" => "data".to_string(),
            trimmed => trimmed.to_string(),
        };
        Self::from_array(name, array)
    }

    /// Wrap an already opened array.
    pub fn from_array(name: impl Into<String>, array: Array<S>) -> Result<Self> {
        let name = name.into();
        check_data_type(array.data_type())?;

        let shape = array.shape().iter().map(|&n| n as usize).collect::<Vec<_>>();
        let attrs = array.attributes();

        let layout = match attrs.get("_ARRAY_DIMENSIONS").and_then(|v| v.as_array()) {
            Some(names) => {
                let names: Vec<&str> = names.iter().filter_map(|v| v.as_str()).collect();
                if names.len() != shape.len() {
                    return Err(GridError::invalid_metadata(format!(
                        "_ARRAY_DIMENSIONS has {} names for rank {}",
                        names.len(),
                        shape.len()
                    )));
                }
                match DimensionLayout::from_names(&names) {
                    Some(layout) => layout,
                    None => DimensionLayout::from_rank(shape.len())?,
                }
            }
            None => DimensionLayout::from_rank(shape.len())?,
        };

        let decoder = decoder_from_attributes(attrs, array.data_type(), array_fill_value(&array));

        tracing::debug!(
            variable = %name,
            shape = ?shape,
            layout = ?layout,
            "Opened Zarr variable"
        );

        Ok(Self {
            name,
            array,
            shape,
            layout,
            decoder,
            source_kind: SourceKind {
                remote: false,
                compressed: true,
            },
        })
    }

    /// Override the storage characteristics, e.g. for an object-store backend.
    pub fn with_source_kind(mut self, source_kind: SourceKind) -> Self {
        self.source_kind = source_kind;
        self
    }

    fn retrieve(&self, subset: &ArraySubset) -> Result<Vec<f64>> {
        macro_rules! retrieve {
            ($t:ty) => {
                self.array
                    .retrieve_array_subset_elements::<$t>(subset)
                    .map_err(|e| GridError::read_failed(e.to_string()))?
            };
        }

        let values = match self.array.data_type() {
            DataType::Float32 => widen(retrieve!(f32)),
            DataType::Float64 => retrieve!(f64),
            DataType::Int16 => widen(retrieve!(i16)),
            DataType::Int32 => widen(retrieve!(i32)),
            DataType::UInt8 => widen(retrieve!(u8)),
            DataType::UInt16 => widen(retrieve!(u16)),
            other => {
                return Err(GridError::zarr_error(format!(
                    "unsupported data type {:?}",
                    other
                )))
            }
        };
        Ok(values)
    }
}

impl<S: ReadableStorageTraits + Send + Sync + 'static> GridVariable for ZarrVariable<S> {
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

        let start: Vec<u64> = ranges.start().iter().map(|&v| v as u64).collect();
        let block_shape = ranges.shape();
        let subset_shape: Vec<u64> = block_shape.iter().map(|&v| v as u64).collect();
        let subset = ArraySubset::new_with_start_shape(start, subset_shape)
            .map_err(|e| GridError::read_failed(e.to_string()))?;

        let values = self.retrieve(&subset)?;
        DataBlock::new(block_shape, values)
    }
}

fn check_data_type(data_type: &DataType) -> Result<()> {
    match data_type {
        DataType::Float32
        | DataType::Float64
        | DataType::Int16
        | DataType::Int32
        | DataType::UInt8
        | DataType::UInt16 => Ok(()),
        other => Err(GridError::zarr_error(format!(
            "unsupported data type {:?}",
            other
        ))),
    }
}

fn widen<T: Into<f64>>(values: Vec<T>) -> Vec<f64> {
    values.into_iter().map(Into::into).collect()
}

/// The array's own fill value, unless it is NaN (already treated as missing).
fn array_fill_value<S: ReadableStorageTraits>(array: &Array<S>) -> Option<f64> {
    let bytes = array.fill_value().as_ne_bytes();
    let value = match array.data_type() {
        DataType::Float32 => bytes.try_into().map(f32::from_ne_bytes).ok().map(f64::from),
        DataType::Float64 => bytes.try_into().map(f64::from_ne_bytes).ok(),
        DataType::Int16 => bytes.try_into().map(i16::from_ne_bytes).ok().map(f64::from),
        DataType::Int32 => bytes.try_into().map(i32::from_ne_bytes).ok().map(f64::from),
        DataType::UInt8 => bytes.first().copied().map(f64::from),
        DataType::UInt16 => bytes.try_into().map(u16::from_ne_bytes).ok().map(f64::from),
        _ => None,
    };
    value.filter(|v| !v.is_nan())
}

/// Round an attribute value to the precision of the stored elements, so it
/// compares equal to raw values widened from that type.
fn narrow_to(data_type: &DataType, value: f64) -> f64 {
    match data_type {
        DataType::Float32 => value as f32 as f64,
        _ => value,
    }
}

fn decoder_from_attributes(
    attrs: &Map<String, Value>,
    data_type: &DataType,
    array_fill: Option<f64>,
) -> ValueDecoder {
    let number = |key: &str| attrs.get(key).and_then(Value::as_f64);
    let raw = |value: Option<f64>| value.map(|v| narrow_to(data_type, v));

    let mut decoder = ValueDecoder::default().with_scale_offset(
        number("scale_factor").unwrap_or(1.0),
        number("add_offset").unwrap_or(0.0),
    );
    // Packing attributes are in decoded units; the rest compare to raw values
    decoder.missing_value = raw(number("missing_value"));
    decoder.fill_value = raw(number("_FillValue")).or(array_fill);

    let (range_min, range_max) = match attrs.get("valid_range").and_then(Value::as_array) {
        Some(range) if range.len() == 2 => (range[0].as_f64(), range[1].as_f64()),
        _ => (None, None),
    };
    decoder.valid_min = raw(number("valid_min").or(range_min));
    decoder.valid_max = raw(number("valid_max").or(range_max));
    decoder
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decoder_from_attributes() {
        let mut attrs = Map::new();
        attrs.insert("scale_factor".to_string(), json!(0.01));
        attrs.insert("add_offset".to_string(), json!(273.15));
        attrs.insert("missing_value".to_string(), json!(-32768));
        attrs.insert("valid_range".to_string(), json!([-5000, 5000]));

        let decoder = decoder_from_attributes(&attrs, &DataType::Int16, Some(-1.0));
        assert_eq!(decoder.scale_factor, 0.01);
        assert_eq!(decoder.add_offset, 273.15);
        assert_eq!(decoder.missing_value, Some(-32768.0));
        assert_eq!(decoder.fill_value, Some(-1.0));
        assert_eq!(decoder.valid_min, Some(-5000.0));
        assert_eq!(decoder.valid_max, Some(5000.0));
    }

    #[test]
    fn test_float32_markers_match_stored_values() {
        let mut attrs = Map::new();
        attrs.insert("missing_value".to_string(), json!(1e20));
        attrs.insert("_FillValue".to_string(), json!(9.96921e36));
        attrs.insert("valid_max".to_string(), json!(0.1));

        let decoder = decoder_from_attributes(&attrs, &DataType::Float32, None);
        assert!(decoder.decode(f64::from(1e20_f32)).is_nan());
        assert!(decoder.decode(f64::from(9.96921e36_f32)).is_nan());
        // The stored maximum itself is still valid
        assert_eq!(decoder.decode(f64::from(0.1_f32)), 0.1_f32);

        // Double arrays keep the attribute as written
        let decoder = decoder_from_attributes(&attrs, &DataType::Float64, None);
        assert_eq!(decoder.missing_value, Some(1e20));
    }

    #[test]
    fn test_decoder_defaults() {
        let decoder = decoder_from_attributes(&Map::new(), &DataType::Float64, None);
        assert_eq!(decoder, ValueDecoder::default());
    }
}
