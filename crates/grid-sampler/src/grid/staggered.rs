//! Grids derived from a base grid by staggering half a cell along each axis.
//!
//! Each staggered cell averages the centres and footprint vertices of the
//! base cells around it. Padded sides extend past the base grid by
//! extrapolating the edge cells linearly.

use super::HorizontalGrid;
use crate::curvilinear::polygon_contains;
use crate::error::{GridError, Result};
use crate::types::GridIndex;
use geo_common::{nearest_equivalent_longitude, BoundingBox, CrsCode, HorizontalPosition};
use nalgebra::Point2;
use projection::ProjectionError;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Placement of staggered points relative to the base cells on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StaggerPadding {
    /// Points between base centres only; one fewer cell than the base.
    NoPadding,
    /// An extra point below the first base centre.
    Low,
    /// An extra point above the last base centre.
    High,
    /// Extra points on both sides; one more cell than the base.
    Both,
    /// Points coincide with the base centres.
    NoOffset,
}

impl StaggerPadding {
    /// Parse an SGRID padding keyword.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" | "no_padding" => Some(Self::NoPadding),
            "low" => Some(Self::Low),
            "high" => Some(Self::High),
            "both" => Some(Self::Both),
            "no_offset" | "nooffset" => Some(Self::NoOffset),
            _ => None,
        }
    }

    /// Number of staggered cells along an axis of `base` cells.
    pub fn staggered_size(self, base: usize) -> usize {
        match self {
            Self::NoPadding => base.saturating_sub(1),
            Self::Both => base + 1,
            Self::Low | Self::High | Self::NoOffset => base,
        }
    }

    /// Smallest base axis this padding can stagger.
    fn min_base_size(self) -> usize {
        match self {
            Self::NoOffset => 1,
            _ => 2,
        }
    }

    /// Base indices averaged into staggered index `index`. Out-of-range
    /// indices are extrapolated.
    fn sources(self, index: usize) -> RangeInclusive<isize> {
        let index = index as isize;
        match self {
            Self::NoPadding | Self::High => index..=index + 1,
            Self::Low | Self::Both => index - 1..=index,
            Self::NoOffset => index..=index,
        }
    }

    /// Offset from a base index to the other staggered cell that can
    /// overlap it.
    fn search_offset(self) -> isize {
        match self {
            Self::NoPadding | Self::High => -1,
            Self::Low | Self::Both => 1,
            Self::NoOffset => 0,
        }
    }

    /// Staggered indices on the sides that extend past the base grid.
    fn padded_edges(self, size: usize) -> impl Iterator<Item = usize> {
        let low = matches!(self, Self::Low | Self::Both).then_some(0);
        let high = matches!(self, Self::High | Self::Both).then_some(size - 1);
        low.into_iter().chain(high)
    }
}

/// Dimensions of the base grid and how to average its longitudes.
#[derive(Debug, Clone, Copy)]
struct BaseLayout {
    nx: usize,
    ny: usize,
    geographic: bool,
}

impl BaseLayout {
    /// Move `point` next to `reference` on the longitude axis.
    fn harmonise(&self, reference: Point2<f64>, point: Point2<f64>) -> Point2<f64> {
        if self.geographic {
            Point2::new(nearest_equivalent_longitude(reference.x, point.x), point.y)
        } else {
            point
        }
    }

    /// Value at base index `(i, j)`, extrapolated from the nearest edge cell
    /// and its inner neighbour when the index lies one step outside.
    fn sample(&self, i: isize, j: isize, value: impl Fn(usize, usize) -> Point2<f64>) -> Point2<f64> {
        let (ei, ii) = edge_and_inner(i, self.nx);
        let (ej, ij) = edge_and_inner(j, self.ny);
        let edge = value(ei, ej);
        if (ei, ej) == (ii, ij) {
            return edge;
        }
        let inner = self.harmonise(edge, value(ii, ij));
        Point2::new(2.0 * edge.x - inner.x, 2.0 * edge.y - inner.y)
    }

    /// Mean of `points`, with longitudes harmonised to the first.
    fn average(&self, points: impl Iterator<Item = Point2<f64>>) -> Point2<f64> {
        let mut reference = None;
        let (mut sx, mut sy, mut count) = (0.0, 0.0, 0.0);
        for point in points {
            let point = match reference {
                None => {
                    reference = Some(point);
                    point
                }
                Some(r) => self.harmonise(r, point),
            };
            sx += point.x;
            sy += point.y;
            count += 1.0;
        }
        Point2::new(sx / count, sy / count)
    }
}

fn edge_and_inner(index: isize, size: usize) -> (usize, usize) {
    if index < 0 {
        (0, 1)
    } else if index as usize >= size {
        (size - 1, size - 2)
    } else {
        (index as usize, index as usize)
    }
}

/// Staggered centres and footprints from row-major base cells.
fn stagger_cells(
    layout: &BaseLayout,
    x_padding: StaggerPadding,
    y_padding: StaggerPadding,
    centres: &[Point2<f64>],
    footprints: &[Vec<Point2<f64>>],
) -> Result<(Vec<Point2<f64>>, Vec<Vec<Point2<f64>>>)> {
    let (nx, ny) = (layout.nx, layout.ny);
    if nx < x_padding.min_base_size() || ny < y_padding.min_base_size() {
        return Err(GridError::invalid_grid(format!(
            "cannot stagger a {nx}x{ny} grid with {x_padding:?}/{y_padding:?} padding"
        )));
    }
    let vertices = footprints.first().map_or(0, Vec::len);
    if vertices < 3 {
        return Err(GridError::invalid_grid(format!(
            "base cell footprints need at least 3 vertices, got {vertices}"
        )));
    }
    if let Some(k) = footprints.iter().position(|f| f.len() != vertices) {
        return Err(GridError::invalid_grid(format!(
            "base cell ({}, {}) has {} footprint vertices, expected {}",
            k % nx,
            k / nx,
            footprints[k].len(),
            vertices
        )));
    }

    let (sx, sy) = (x_padding.staggered_size(nx), y_padding.staggered_size(ny));
    let mut staggered_centres = Vec::with_capacity(sx * sy);
    let mut staggered_footprints = Vec::with_capacity(sx * sy);
    for j in 0..sy {
        for i in 0..sx {
            let sources = || {
                let xs = x_padding.sources(i);
                y_padding
                    .sources(j)
                    .flat_map(move |bj| xs.clone().map(move |bi| (bi, bj)))
            };
            let centre = layout.average(
                sources().map(|(bi, bj)| layout.sample(bi, bj, |ci, cj| centres[cj * nx + ci])),
            );
            let footprint = (0..vertices)
                .map(|v| {
                    let vertex = layout.average(sources().map(|(bi, bj)| {
                        layout.sample(bi, bj, |ci, cj| footprints[cj * nx + ci][v])
                    }));
                    layout.harmonise(centre, vertex)
                })
                .collect();
            staggered_centres.push(centre);
            staggered_footprints.push(footprint);
        }
    }
    Ok((staggered_centres, staggered_footprints))
}

/// A grid whose cells sit half a base cell away from those of `base`.
///
/// Positions are located in the base CRS.
#[derive(Debug, Clone)]
pub struct StaggeredGrid {
    base: Arc<HorizontalGrid>,
    x_padding: StaggerPadding,
    y_padding: StaggerPadding,
    x_size: usize,
    y_size: usize,
    centres: Vec<Point2<f64>>,
    footprints: Vec<Vec<Point2<f64>>>,
    bbox: BoundingBox,
    crs: CrsCode,
}

impl StaggeredGrid {
    /// Derive the staggered grid of `base`.
    ///
    /// Every base cell must have a footprint with the same number of
    /// vertices, and each padded or shrunk axis needs at least two cells.
    pub fn derive(
        base: impl Into<Arc<HorizontalGrid>>,
        x_padding: StaggerPadding,
        y_padding: StaggerPadding,
    ) -> Result<Self> {
        let base = base.into();
        let crs = base.crs();
        let layout = BaseLayout {
            nx: base.x_size(),
            ny: base.y_size(),
            geographic: crs.is_geographic(),
        };
        let indices = || {
            (0..layout.ny).flat_map(move |j| (0..layout.nx).map(move |i| GridIndex::new(i, j)))
        };
        let centres: Vec<_> = indices()
            .map(|index| {
                let p = base.cell_centre(index);
                Point2::new(p.x, p.y)
            })
            .collect();
        let footprints: Vec<Vec<_>> = indices()
            .map(|index| {
                base.cell_footprint(index)
                    .into_iter()
                    .map(|p| Point2::new(p.x, p.y))
                    .collect()
            })
            .collect();

        let (centres, footprints) =
            stagger_cells(&layout, x_padding, y_padding, &centres, &footprints)?;
        let bbox = BoundingBox::enclosing(footprints.iter().flatten().map(|p| (p.x, p.y)))
            .ok_or_else(|| GridError::invalid_grid("staggered grid has no finite vertices"))?;

        Ok(Self {
            x_size: x_padding.staggered_size(layout.nx),
            y_size: y_padding.staggered_size(layout.ny),
            base,
            x_padding,
            y_padding,
            centres,
            footprints,
            bbox,
            crs,
        })
    }

    pub fn base(&self) -> &HorizontalGrid {
        &self.base
    }

    pub fn x_padding(&self) -> StaggerPadding {
        self.x_padding
    }

    pub fn y_padding(&self) -> StaggerPadding {
        self.y_padding
    }

    pub fn x_size(&self) -> usize {
        self.x_size
    }

    pub fn y_size(&self) -> usize {
        self.y_size
    }

    pub fn crs(&self) -> CrsCode {
        self.crs
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    pub fn cell_centre(&self, index: GridIndex) -> HorizontalPosition {
        let centre = self.centres[index.j * self.x_size + index.i];
        HorizontalPosition::new(centre.x, centre.y, self.crs)
    }

    pub fn cell_footprint(&self, index: GridIndex) -> Vec<HorizontalPosition> {
        self.footprints[index.j * self.x_size + index.i]
            .iter()
            .map(|p| HorizontalPosition::new(p.x, p.y, self.crs))
            .collect()
    }

    /// Cell containing `position`, which must be in the base CRS.
    ///
    /// The base grid narrows the search to the staggered cells overlapping
    /// the matching base cell. Points beyond the base grid are only found in
    /// the padded edge rows and columns.
    pub fn find_index_of(&self, position: &HorizontalPosition) -> Result<Option<GridIndex>> {
        if position.crs != self.crs {
            return Err(ProjectionError::UnsupportedCrs(position.crs).into());
        }
        let x = if self.crs.is_geographic() {
            nearest_equivalent_longitude(self.bbox.min_x + 0.5 * self.bbox.width(), position.x)
        } else {
            position.x
        };
        let y = position.y;
        if !self.bbox.contains_point(x, y) {
            return Ok(None);
        }

        let Some(base_index) = self.base.find_index_of(position)? else {
            return Ok(self.search_padded_edges(x, y));
        };
        let (dx, dy) = (self.x_padding.search_offset(), self.y_padding.search_offset());
        let candidates = [(0, 0), (dx, 0), (0, dy), (dx, dy)];
        for (k, &(oi, oj)) in candidates.iter().enumerate() {
            if candidates[..k].contains(&(oi, oj)) {
                continue;
            }
            let (i, j) = (base_index.i as isize + oi, base_index.j as isize + oj);
            if i < 0 || j < 0 {
                continue;
            }
            let (i, j) = (i as usize, j as usize);
            if i < self.x_size && j < self.y_size && self.cell_contains(i, j, x, y) {
                return Ok(Some(GridIndex::new(i, j)));
            }
        }
        Ok(None)
    }

    fn search_padded_edges(&self, x: f64, y: f64) -> Option<GridIndex> {
        let columns = self
            .x_padding
            .padded_edges(self.x_size)
            .flat_map(|i| (0..self.y_size).map(move |j| (i, j)));
        let rows = self
            .y_padding
            .padded_edges(self.y_size)
            .flat_map(|j| (0..self.x_size).map(move |i| (i, j)));
        columns
            .chain(rows)
            .find(|&(i, j)| self.cell_contains(i, j, x, y))
            .map(|(i, j)| GridIndex::new(i, j))
    }

    fn cell_contains(&self, i: usize, j: usize, x: f64, y: f64) -> bool {
        let k = j * self.x_size + i;
        let x = if self.crs.is_geographic() {
            nearest_equivalent_longitude(self.centres[k].x, x)
        } else {
            x
        };
        polygon_contains(&self.footprints[k], Point2::new(x, y))
    }
}
