//! Extraction entry point.

use crate::config::ExtractionConfig;
use crate::domain::TargetDomain;
use crate::error::Result;
use crate::grid::HorizontalGrid;
use crate::reading::{DataReadingStrategy, GridVariable};

/// Read `variable` at every point of `target`.
///
/// `source` is the horizontal grid of `variable`. `t_index` and `z_index`
/// select the time and vertical level and are ignored when the variable has
/// no such dimension. The result has one value per target point in target
/// order, NaN where there is no data.
pub fn read_values(
    strategy: DataReadingStrategy,
    variable: &dyn GridVariable,
    t_index: Option<usize>,
    z_index: Option<usize>,
    source: &HorizontalGrid,
    target: &TargetDomain,
) -> Result<Vec<f32>> {
    let pixel_map = target.pixel_map(source)?;
    if pixel_map.is_empty() {
        tracing::debug!(
            variable = variable.name(),
            target_size = pixel_map.target_domain_size(),
            "No target point falls inside the source grid"
        );
        return Ok(vec![f32::NAN; pixel_map.target_domain_size()]);
    }
    strategy.read(&pixel_map, variable, t_index, z_index)
}

/// [`read_values`] with the strategy chosen for the variable's storage.
pub fn read_values_with_config(
    config: &ExtractionConfig,
    variable: &dyn GridVariable,
    t_index: Option<usize>,
    z_index: Option<usize>,
    source: &HorizontalGrid,
    target: &TargetDomain,
) -> Result<Vec<f32>> {
    let strategy = DataReadingStrategy::select(variable.source_kind(), config);
    read_values(strategy, variable, t_index, z_index, source, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::ReferenceableAxis;
    use crate::grid::RectilinearGrid;
    use crate::reading::InMemoryVariable;
    use geo_common::{CrsCode, HorizontalPosition};

    fn source() -> HorizontalGrid {
        RectilinearGrid::new(
            ReferenceableAxis::regular("lon", 0.0, 1.0, 4, true).unwrap(),
            ReferenceableAxis::regular("lat", 0.0, 1.0, 3, false).unwrap(),
            CrsCode::Epsg4326,
        )
        .unwrap()
        .into()
    }

    fn variable() -> InMemoryVariable {
        let values = (0..12).map(|k| (10 * (k / 4) + k % 4) as f64).collect();
        InMemoryVariable::from_2d("v", 3, 4, values).unwrap()
    }

    #[test]
    fn test_read_values_for_points() {
        let target = TargetDomain::Points(vec![
            HorizontalPosition::lon_lat(3.0, 2.0),
            HorizontalPosition::lon_lat(20.0, 20.0),
            HorizontalPosition::lon_lat(0.2, 0.9),
        ]);
        let values = read_values(
            DataReadingStrategy::Scanline,
            &variable(),
            None,
            None,
            &source(),
            &target,
        )
        .unwrap();

        assert_eq!(values[0], 23.0);
        assert!(values[1].is_nan());
        assert_eq!(values[2], 10.0);
    }

    #[test]
    fn test_empty_target() {
        let target = TargetDomain::Points(Vec::new());
        let var = variable();
        let values = read_values(
            DataReadingStrategy::BoundingBox,
            &var,
            None,
            None,
            &source(),
            &target,
        )
        .unwrap();
        assert!(values.is_empty());
        assert_eq!(var.read_count(), 0);
    }

    #[test]
    fn test_read_values_with_config() {
        let grid = source();
        let target = TargetDomain::Grid(grid.clone());
        assert_eq!(target.size(), 12);

        let values = read_values_with_config(
            &ExtractionConfig::default(),
            &variable(),
            None,
            None,
            &grid,
            &target,
        )
        .unwrap();
        assert_eq!(values[5], 11.0);
        assert_eq!(values[11], 23.0);
    }
}
