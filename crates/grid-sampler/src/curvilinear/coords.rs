//! Explicit per-cell coordinates of a curvilinear grid.
//!
//! Centres are given as row-major `nj x ni` longitude and latitude arrays.
//! Cell footprints are quadrilaterals whose corners are the means of the four
//! surrounding centres, extrapolated linearly along the outer edges.

use crate::error::{GridError, Result};
use crate::types::GridIndex;
use geo_common::{constrain_longitude_180, nearest_equivalent_longitude, BoundingBox};
use nalgebra::Point2;
use std::hash::{Hash, Hasher};

/// Lon/lat centres and derived corners of a curvilinear grid.
#[derive(Debug, Clone)]
pub struct CurvilinearCoords {
    ni: usize,
    nj: usize,
    longitudes: Vec<f64>,
    latitudes: Vec<f64>,
    /// `(nj + 1) x (ni + 1)` corner longitudes, row-major
    corner_lons: Vec<f64>,
    /// `(nj + 1) x (ni + 1)` corner latitudes, row-major
    corner_lats: Vec<f64>,
    bbox: BoundingBox,
}

impl CurvilinearCoords {
    /// Build from row-major centre arrays of shape `nj x ni`.
    ///
    /// Longitudes are constrained to (-180, 180]. A NaN in either array
    /// marks the cell as missing.
    pub fn new(ni: usize, nj: usize, longitudes: Vec<f64>, latitudes: Vec<f64>) -> Result<Self> {
        let size = ni * nj;
        if longitudes.len() != size || latitudes.len() != size {
            return Err(GridError::invalid_grid(format!(
                "lon and lat arrays must both hold {} x {} = {} values, got {} and {}",
                ni,
                nj,
                size,
                longitudes.len(),
                latitudes.len()
            )));
        }
        if ni < 3 || nj < 3 {
            return Err(GridError::invalid_grid(format!(
                "curvilinear coordinates need at least 3 points in each dimension, got {} x {}",
                ni, nj
            )));
        }

        let mut lons = Vec::with_capacity(size);
        let mut lats = Vec::with_capacity(size);
        for (&lon, &lat) in longitudes.iter().zip(&latitudes) {
            if lon.is_nan() || lat.is_nan() {
                lons.push(f64::NAN);
                lats.push(f64::NAN);
            } else {
                lons.push(constrain_longitude_180(lon));
                lats.push(lat);
            }
        }

        let bbox = BoundingBox::enclosing(lons.iter().copied().zip(lats.iter().copied()))
            .ok_or_else(|| GridError::invalid_grid("no valid positions in coordinate arrays"))?;

        let corner_lons = make_corners(&lons, ni, nj, true);
        let corner_lats = make_corners(&lats, ni, nj, false);

        Ok(Self {
            ni,
            nj,
            longitudes: lons,
            latitudes: lats,
            corner_lons,
            corner_lats,
            bbox,
        })
    }

    pub fn ni(&self) -> usize {
        self.ni
    }

    pub fn nj(&self) -> usize {
        self.nj
    }

    pub fn size(&self) -> usize {
        self.ni * self.nj
    }

    /// Bounding box of all valid cell centres.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// Bounding box of all finite cell corners, harmonised to their cells.
    pub fn corner_bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(
            self.cells()
                .flat_map(|cell| cell.corners())
                .map(|p| (p.x, p.y)),
        )
    }

    /// Centre of cell `(i, j)` as (lon, lat).
    pub fn centre(&self, i: usize, j: usize) -> Point2<f64> {
        let index = j * self.ni + i;
        Point2::new(self.longitudes[index], self.latitudes[index])
    }

    fn corner(&self, ci: usize, cj: usize) -> Point2<f64> {
        let index = cj * (self.ni + 1) + ci;
        Point2::new(self.corner_lons[index], self.corner_lats[index])
    }

    /// The cell at `(i, j)`, or `None` outside the grid.
    pub fn cell(&self, i: usize, j: usize) -> Option<Cell<'_>> {
        (i < self.ni && j < self.nj).then_some(Cell { coords: self, i, j })
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> + '_ {
        (0..self.size()).map(move |index| Cell {
            coords: self,
            i: index % self.ni,
            j: index / self.ni,
        })
    }

    /// Mean footprint area in squared degrees, ignoring degenerate cells.
    pub fn mean_cell_area(&self) -> f64 {
        let (sum, count) = self
            .cells()
            .map(|cell| cell.area())
            .filter(|area| !area.is_nan())
            .fold((0.0, 0usize), |(sum, count), area| (sum + area, count + 1));
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }
}

impl PartialEq for CurvilinearCoords {
    fn eq(&self, other: &Self) -> bool {
        self.ni == other.ni
            && self.nj == other.nj
            && bits_equal(&self.longitudes, &other.longitudes)
            && bits_equal(&self.latitudes, &other.latitudes)
    }
}

impl Eq for CurvilinearCoords {}

impl Hash for CurvilinearCoords {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ni.hash(state);
        self.nj.hash(state);
        for v in self.longitudes.iter().chain(&self.latitudes) {
            v.to_bits().hash(state);
        }
    }
}

fn bits_equal(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
}

/// Corner values for one coordinate, shape `(nj + 1) x (ni + 1)`.
fn make_corners(centres: &[f64], ni: usize, nj: usize, is_longitude: bool) -> Vec<f64> {
    let width = ni + 1;
    let mut edges = vec![f64::NAN; width * (nj + 1)];
    let at = |i: usize, j: usize| j * width + i;
    let align = |reference: f64, value: f64| {
        if is_longitude {
            nearest_equivalent_longitude(reference, value)
        } else {
            value
        }
    };

    for j in 0..nj - 1 {
        for i in 0..ni - 1 {
            let c1 = centres[j * ni + i];
            let c2 = align(c1, centres[j * ni + i + 1]);
            let c3 = align(c1, centres[(j + 1) * ni + i]);
            let c4 = align(c1, centres[(j + 1) * ni + i + 1]);
            edges[at(i + 1, j + 1)] = (c1 + c2 + c3 + c4) / 4.0;
        }

        // Extrapolate to the first and last column of this row
        let e1 = edges[at(1, j + 1)];
        let e2 = align(e1, edges[at(2, j + 1)]);
        edges[at(0, j + 1)] = e1 - (e2 - e1);

        let last = edges[at(ni - 1, j + 1)];
        let before = align(last, edges[at(ni - 2, j + 1)]);
        edges[at(ni, j + 1)] = last + (last - before);
    }

    // Extrapolate to the first and last row
    for x in 0..width {
        let e1 = edges[at(x, 1)];
        let e2 = align(e1, edges[at(x, 2)]);
        edges[at(x, 0)] = e1 - (e2 - e1);

        let last = edges[at(x, nj - 1)];
        let before = align(last, edges[at(x, nj - 2)]);
        edges[at(x, nj)] = last + (last - before);
    }

    edges
}

/// One cell of a curvilinear grid.
#[derive(Debug, Clone, Copy)]
pub struct Cell<'a> {
    coords: &'a CurvilinearCoords,
    i: usize,
    j: usize,
}

impl PartialEq for Cell<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.i == other.i && self.j == other.j
    }
}

impl Eq for Cell<'_> {}

impl Hash for Cell<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.i.hash(state);
        self.j.hash(state);
    }
}

impl<'a> Cell<'a> {
    pub fn i(&self) -> usize {
        self.i
    }

    pub fn j(&self) -> usize {
        self.j
    }

    pub fn index(&self) -> GridIndex {
        GridIndex::new(self.i, self.j)
    }

    pub fn centre(&self) -> Point2<f64> {
        self.coords.centre(self.i, self.j)
    }

    fn harmonize(&self, lon: f64) -> f64 {
        nearest_equivalent_longitude(self.centre().x, lon)
    }

    /// Corners in the order (i, j), (i+1, j), (i+1, j+1), (i, j+1), with
    /// longitudes moved next to the centre.
    pub fn corners(&self) -> [Point2<f64>; 4] {
        let (i, j) = (self.i, self.j);
        [(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)].map(|(ci, cj)| {
            let corner = self.coords.corner(ci, cj);
            Point2::new(self.harmonize(corner.x), corner.y)
        })
    }

    /// Even-odd test of the point against the cell footprint.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        polygon_contains(&self.corners(), Point2::new(self.harmonize(lon), lat))
    }

    /// Squared lon/lat distance from the point to the cell centre.
    pub fn distance_sq(&self, lon: f64, lat: f64) -> f64 {
        let centre = self.centre();
        let dx = self.harmonize(lon) - centre.x;
        let dy = lat - centre.y;
        dx * dx + dy * dy
    }

    pub fn edge_neighbours(&self) -> Vec<Cell<'a>> {
        let (i, j) = (self.i, self.j);
        let (ni, nj) = (self.coords.ni, self.coords.nj);
        let mut neighbours = Vec::with_capacity(4);
        if i > 0 {
            neighbours.push(self.at(i - 1, j));
        }
        if j > 0 {
            neighbours.push(self.at(i, j - 1));
        }
        if i + 1 < ni {
            neighbours.push(self.at(i + 1, j));
        }
        if j + 1 < nj {
            neighbours.push(self.at(i, j + 1));
        }
        neighbours
    }

    pub fn corner_neighbours(&self) -> Vec<Cell<'a>> {
        let (i, j) = (self.i, self.j);
        let (ni, nj) = (self.coords.ni, self.coords.nj);
        let mut neighbours = Vec::with_capacity(4);
        if i > 0 && j > 0 {
            neighbours.push(self.at(i - 1, j - 1));
        }
        if i + 1 < ni && j > 0 {
            neighbours.push(self.at(i + 1, j - 1));
        }
        if i + 1 < ni && j + 1 < nj {
            neighbours.push(self.at(i + 1, j + 1));
        }
        if i > 0 && j + 1 < nj {
            neighbours.push(self.at(i - 1, j + 1));
        }
        neighbours
    }

    /// Edge neighbours followed by corner neighbours.
    pub fn neighbours(&self) -> Vec<Cell<'a>> {
        let mut neighbours = self.edge_neighbours();
        neighbours.extend(self.corner_neighbours());
        neighbours
    }

    fn at(&self, i: usize, j: usize) -> Cell<'a> {
        Cell {
            coords: self.coords,
            i,
            j,
        }
    }

    /// Planar area of the footprint in squared degrees.
    ///
    /// Uses Bretschneider's formula from the four sides and two diagonals.
    /// NaN when any corner is missing.
    pub fn area(&self) -> f64 {
        let [p1, p2, p3, p4] = self.corners();
        let a2 = (p1 - p2).norm_squared();
        let b2 = (p2 - p3).norm_squared();
        let c2 = (p3 - p4).norm_squared();
        let d2 = (p4 - p1).norm_squared();
        let f2 = (p1 - p3).norm_squared();
        let g2 = (p2 - p4).norm_squared();
        let term = b2 + d2 - a2 - c2;
        (4.0 * f2 * g2 - term * term).sqrt() / 4.0
    }

    /// Minimum bounding rectangle of the corners.
    pub fn bounding_rectangle(&self) -> Option<BoundingBox> {
        let corners = self.corners();
        if corners.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return None;
        }
        BoundingBox::enclosing(corners.iter().map(|p| (p.x, p.y)))
    }
}

/// Even-odd crossing test. Points with NaN coordinates are never inside.
pub(crate) fn polygon_contains(polygon: &[Point2<f64>], point: Point2<f64>) -> bool {
    let mut inside = false;
    let mut k = polygon.len() - 1;
    for m in 0..polygon.len() {
        let (a, b) = (polygon[m], polygon[k]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        k = m;
    }
    inside
}

/// True if `point` lies within `tolerance` of any polygon edge.
pub(crate) fn near_polygon_edge(polygon: &[Point2<f64>], point: Point2<f64>, tolerance: f64) -> bool {
    let mut k = polygon.len() - 1;
    for m in 0..polygon.len() {
        let (a, b) = (polygon[k], polygon[m]);
        let edge = b - a;
        let length_sq = edge.norm_squared();
        let t = if length_sq > 0.0 {
            ((point - a).dot(&edge) / length_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        if (point - (a + edge * t)).norm() <= tolerance {
            return true;
        }
        k = m;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regular_coords(ni: usize, nj: usize, lon0: f64, lat0: f64, step: f64) -> CurvilinearCoords {
        let mut lons = Vec::new();
        let mut lats = Vec::new();
        for j in 0..nj {
            for i in 0..ni {
                lons.push(lon0 + i as f64 * step);
                lats.push(lat0 + j as f64 * step);
            }
        }
        CurvilinearCoords::new(ni, nj, lons, lats).unwrap()
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(CurvilinearCoords::new(3, 3, vec![0.0; 9], vec![0.0; 8]).is_err());
        assert!(CurvilinearCoords::new(2, 5, vec![0.0; 10], vec![0.0; 10]).is_err());
        assert!(CurvilinearCoords::new(3, 3, vec![f64::NAN; 9], vec![0.0; 9]).is_err());
    }

    #[test]
    fn test_corners_of_regular_grid() {
        let coords = regular_coords(4, 3, 10.0, 20.0, 1.0);
        let cell = coords.cell(1, 1).unwrap();
        let corners = cell.corners();
        assert_eq!(corners[0], Point2::new(10.5, 20.5));
        assert_eq!(corners[1], Point2::new(11.5, 20.5));
        assert_eq!(corners[2], Point2::new(11.5, 21.5));
        assert_eq!(corners[3], Point2::new(10.5, 21.5));

        // Extrapolated outer corner
        let corner = coords.cell(0, 0).unwrap().corners()[0];
        assert_eq!(corner, Point2::new(9.5, 19.5));
        let corner = coords.cell(3, 2).unwrap().corners()[2];
        assert_eq!(corner, Point2::new(13.5, 22.5));

        let bbox = coords.corner_bounding_box().unwrap();
        assert_eq!(bbox, BoundingBox::new(9.5, 19.5, 13.5, 22.5));
        assert_eq!(coords.bounding_box(), BoundingBox::new(10.0, 20.0, 13.0, 22.0));
    }

    #[test]
    fn test_area_and_containment() {
        let coords = regular_coords(5, 5, 0.0, 0.0, 2.0);
        assert!((coords.mean_cell_area() - 4.0).abs() < 1e-9);

        let cell = coords.cell(2, 2).unwrap();
        assert!(cell.contains(4.9, 3.1));
        assert!(!cell.contains(5.1, 4.0));
        assert!((cell.distance_sq(5.0, 4.0) - 1.0).abs() < 1e-12);
        assert_eq!(
            cell.bounding_rectangle().unwrap(),
            BoundingBox::new(3.0, 3.0, 5.0, 5.0)
        );
    }

    #[test]
    fn test_neighbours() {
        let coords = regular_coords(3, 3, 0.0, 0.0, 1.0);
        let corner = coords.cell(0, 0).unwrap();
        assert_eq!(corner.edge_neighbours().len(), 2);
        assert_eq!(corner.corner_neighbours().len(), 1);

        let middle = coords.cell(1, 1).unwrap();
        let all: Vec<GridIndex> = middle.neighbours().iter().map(|c| c.index()).collect();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0], GridIndex::new(0, 1));
        assert_eq!(all[3], GridIndex::new(1, 2));
        assert_eq!(all[4], GridIndex::new(0, 0));
        assert!(coords.cell(3, 0).is_none());
    }

    #[test]
    fn test_antimeridian_cells() {
        // Centres at 173, 177, -179 straddle the antimeridian
        let lons = vec![173.0, 177.0, -179.0, 173.0, 177.0, -179.0, 173.0, 177.0, -179.0];
        let lats = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0];
        let coords = CurvilinearCoords::new(3, 3, lons, lats).unwrap();

        let cell = coords.cell(2, 1).unwrap();
        assert!(cell.contains(-179.5, 1.0));
        assert!(cell.contains(180.5, 1.0));
        assert!((cell.area() - 4.0).abs() < 1e-9);

        let centre_cell = coords.cell(1, 1).unwrap();
        assert!(centre_cell.contains(178.0, 1.2));
        assert!(!centre_cell.contains(-178.0, 1.2));
    }

    #[test]
    fn test_missing_centres() {
        let mut lons: Vec<f64> = (0..36).map(|k| (k % 6) as f64).collect();
        let lats: Vec<f64> = (0..36).map(|k| (k / 6) as f64).collect();
        lons[7] = f64::NAN;
        let coords = CurvilinearCoords::new(6, 6, lons, lats).unwrap();

        let cell = coords.cell(1, 1).unwrap();
        assert!(cell.centre().x.is_nan());
        assert!(!cell.contains(1.0, 1.0));
        assert!(coords.cell(1, 1).unwrap().area().is_nan());
        assert!((coords.mean_cell_area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_equality_by_content() {
        let a = regular_coords(3, 4, 0.0, 0.0, 0.5);
        let b = regular_coords(3, 4, 0.0, 0.0, 0.5);
        let c = regular_coords(3, 4, 0.0, 0.0, 0.25);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
