//! Mapping from source-grid cells to target-domain points.
//!
//! A [`PixelMap`] records, for every target point that falls inside the source
//! grid, the source cell it falls in. Pairs are stored in two compressed index
//! arrays and sorted by source cell so that all target points sharing one cell
//! are contiguous. Reading strategies walk the map once, reading each source
//! cell a single time and fanning the value out to its target points.

mod compressed;

pub use compressed::CompressedIndexArray;

use crate::error::{GridError, Result};
use crate::grid::HorizontalGrid;
use crate::types::IndexBounds;
use geo_common::HorizontalPosition;
use std::iter::Peekable;
use std::time::Instant;

/// Largest target domain a pixel map can address.
pub const MAX_TARGET_DOMAIN_SIZE: u64 = i32::MAX as u64;

/// Sorted `(source cell, target point)` pairs.
#[derive(Debug, Clone)]
pub struct PixelMap {
    /// `j * source_x_size + i` of the matched source cell
    source: CompressedIndexArray,
    /// Position of the target point in target iteration order
    target: CompressedIndexArray,
    source_x_size: usize,
    target_domain_size: usize,
    bounds: Option<IndexBounds>,
}

impl PixelMap {
    fn new(source: &HorizontalGrid, target_domain_size: u64) -> Result<Self> {
        if target_domain_size > MAX_TARGET_DOMAIN_SIZE {
            return Err(GridError::DomainTooLarge {
                size: target_domain_size,
                max: MAX_TARGET_DOMAIN_SIZE,
            });
        }
        Ok(Self {
            source: CompressedIndexArray::for_max_value(source.size().saturating_sub(1)),
            target: CompressedIndexArray::for_max_value(target_domain_size.saturating_sub(1)),
            source_x_size: source.x_size(),
            target_domain_size: target_domain_size as usize,
            bounds: None,
        })
    }

    /// Build the map for every cell centre of `target`, in row-major order.
    ///
    /// When both grids are rectilinear in WGS84 lon/lat the source x index is
    /// computed once per target column instead of once per target point.
    pub fn for_grid(source: &HorizontalGrid, target: &HorizontalGrid) -> Result<Self> {
        let start = Instant::now();
        let mut map = Self::new(source, target.size())?;

        match (source.lon_lat_axes(), target.lon_lat_axes()) {
            (Some((source_x, source_y)), Some((target_x, target_y))) => {
                let x_indices: Vec<Option<usize>> = (0..target_x.size())
                    .map(|i| source_x.find_index_of(target_x.coordinate_value(i)))
                    .collect();
                let nx = x_indices.len();

                for j in 0..target_y.size() {
                    let lat = target_y.coordinate_value(j);
                    if !(-90.0..=90.0).contains(&lat) {
                        continue;
                    }
                    let Some(source_j) = source_y.find_index_of(lat) else {
                        continue;
                    };
                    let row_start = j * nx;
                    for (i, source_i) in x_indices.iter().enumerate() {
                        if let Some(source_i) = *source_i {
                            map.put(source_i, source_j, row_start + i)?;
                        }
                    }
                }
            }
            _ => {
                for (k, position) in target.positions().enumerate() {
                    if let Some(index) = source.find_index_of(&position)? {
                        map.put(index.i, index.j, k)?;
                    }
                }
            }
        }

        map.sort();
        tracing::debug!(
            target_size = map.target_domain_size,
            pairs = map.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Built pixel map for grid"
        );
        Ok(map)
    }

    /// Build the map for a list of target positions, in list order.
    pub fn for_list(source: &HorizontalGrid, positions: &[HorizontalPosition]) -> Result<Self> {
        let start = Instant::now();
        let mut map = Self::new(source, positions.len() as u64)?;

        for (k, position) in positions.iter().enumerate() {
            if let Some(index) = source.find_index_of(position)? {
                map.put(index.i, index.j, k)?;
            }
        }

        map.sort();
        tracing::debug!(
            target_size = map.target_domain_size,
            pairs = map.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Built pixel map for position list"
        );
        Ok(map)
    }

    fn put(&mut self, i: usize, j: usize, target_index: usize) -> Result<()> {
        let source_index = j as u64 * self.source_x_size as u64 + i as u64;
        self.source.push(source_index)?;
        self.target.push(target_index as u64)?;
        match self.bounds.as_mut() {
            Some(bounds) => bounds.include(i, j),
            None => self.bounds = Some(IndexBounds::at(i, j)),
        }
        Ok(())
    }

    fn pair(&self, k: usize) -> (u64, u64) {
        (self.source.get(k), self.target.get(k))
    }

    fn exchange(&mut self, a: usize, b: usize) {
        self.source.swap(a, b);
        self.target.swap(a, b);
    }

    fn sort(&mut self) {
        if self.len() < 2 {
            return;
        }
        self.quicksort(0, self.len() - 1);
    }

    /// In-place quicksort of the paired arrays by `(source, target)`.
    ///
    /// Recurses into the smaller partition and loops over the larger, so the
    /// stack depth stays logarithmic.
    fn quicksort(&mut self, mut low: usize, mut high: usize) {
        loop {
            let pivot = self.pair(low + (high - low) / 2);
            let mut i = low as isize;
            let mut j = high as isize;

            while i <= j {
                while self.pair(i as usize) < pivot {
                    i += 1;
                }
                while self.pair(j as usize) > pivot {
                    j -= 1;
                }
                if i <= j {
                    self.exchange(i as usize, j as usize);
                    i += 1;
                    j -= 1;
                }
            }

            let left = (low as isize) < j;
            let right = i < high as isize;
            match (left, right) {
                (true, true) => {
                    if (j as usize - low) < (high - i as usize) {
                        self.quicksort(low, j as usize);
                        low = i as usize;
                    } else {
                        self.quicksort(i as usize, high);
                        high = j as usize;
                    }
                }
                (true, false) => high = j as usize,
                (false, true) => low = i as usize,
                (false, false) => return,
            }
        }
    }

    /// True if no target point matched a source cell.
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Number of stored `(source, target)` pairs.
    pub fn len(&self) -> usize {
        self.source.len()
    }

    /// Number of points in the target domain, matched or not.
    pub fn target_domain_size(&self) -> usize {
        self.target_domain_size
    }

    /// Number of cells along x in the source grid.
    pub fn source_x_size(&self) -> usize {
        self.source_x_size
    }

    /// Min/max source `i` and `j` over all pairs; `None` when empty.
    pub fn index_bounds(&self) -> Option<IndexBounds> {
        self.bounds
    }

    /// Cells in the rectangle spanned by [`index_bounds`](Self::index_bounds).
    pub fn bounding_box_size(&self) -> u64 {
        self.bounds.map(|b| b.size()).unwrap_or(0)
    }

    /// Number of distinct source cells. Requires a full pass.
    pub fn num_unique_ij_pairs(&self) -> usize {
        self.entries().count()
    }

    /// Cells read by row-wise extraction: `max_i - min_i + 1` summed per row.
    pub fn sum_row_lengths(&self) -> u64 {
        self.scanlines().map(|s| s.width() as u64).sum()
    }

    /// Heap usage of the two index arrays in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.source.memory_bytes() + self.target.memory_bytes()
    }

    /// Entries in ascending source-cell order, one per distinct cell.
    pub fn entries(&self) -> Entries<'_> {
        Entries { map: self, pos: 0 }
    }

    /// Entries grouped by source row, in ascending `j`.
    pub fn scanlines(&self) -> Scanlines<'_> {
        Scanlines {
            entries: self.entries().peekable(),
        }
    }
}

/// One source cell and the target points that fall in it.
#[derive(Debug, Clone, Copy)]
pub struct PixelMapEntry<'a> {
    map: &'a PixelMap,
    start: usize,
    end: usize,
    i: usize,
    j: usize,
}

impl<'a> PixelMapEntry<'a> {
    /// Source x index.
    pub fn i(&self) -> usize {
        self.i
    }

    /// Source y index.
    pub fn j(&self) -> usize {
        self.j
    }

    pub fn num_targets(&self) -> usize {
        self.end - self.start
    }

    /// Target indices in ascending order.
    pub fn targets(&self) -> impl Iterator<Item = usize> + 'a {
        let map = self.map;
        (self.start..self.end).map(move |k| map.target.get(k) as usize)
    }
}

/// Iterator over [`PixelMapEntry`] values.
#[derive(Debug, Clone)]
pub struct Entries<'a> {
    map: &'a PixelMap,
    pos: usize,
}

impl<'a> Iterator for Entries<'a> {
    type Item = PixelMapEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.map.len();
        if self.pos >= len {
            return None;
        }

        let start = self.pos;
        let source_index = self.map.source.get(start);
        let mut end = start + 1;
        while end < len && self.map.source.get(end) == source_index {
            end += 1;
        }
        self.pos = end;

        let nx = self.map.source_x_size as u64;
        Some(PixelMapEntry {
            map: self.map,
            start,
            end,
            i: (source_index % nx) as usize,
            j: (source_index / nx) as usize,
        })
    }
}

/// All entries that share one source row.
#[derive(Debug, Clone)]
pub struct Scanline<'a> {
    j: usize,
    entries: Vec<PixelMapEntry<'a>>,
}

impl<'a> Scanline<'a> {
    /// Source y index of the row.
    pub fn j(&self) -> usize {
        self.j
    }

    /// Entries in ascending `i`.
    pub fn entries(&self) -> &[PixelMapEntry<'a>] {
        &self.entries
    }

    /// Smallest `i` in the row.
    pub fn min_i(&self) -> usize {
        self.entries.first().map(|e| e.i).unwrap_or(0)
    }

    /// Largest `i` in the row.
    pub fn max_i(&self) -> usize {
        self.entries.last().map(|e| e.i).unwrap_or(0)
    }

    /// Cells spanned from `min_i` to `max_i`.
    pub fn width(&self) -> usize {
        self.max_i() - self.min_i() + 1
    }
}

/// Iterator over [`Scanline`] values.
pub struct Scanlines<'a> {
    entries: Peekable<Entries<'a>>,
}

impl<'a> Iterator for Scanlines<'a> {
    type Item = Scanline<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.entries.next()?;
        let j = first.j;
        let mut entries = vec![first];
        while let Some(entry) = self.entries.next_if(|e| e.j == j) {
            entries.push(entry);
        }
        Some(Scanline { j, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::ReferenceableAxis;
    use crate::grid::RectilinearGrid;
    use geo_common::CrsCode;
    use std::collections::HashSet;

    fn lon_lat_grid(
        lon0: f64,
        dlon: f64,
        nlon: usize,
        lat0: f64,
        dlat: f64,
        nlat: usize,
    ) -> HorizontalGrid {
        RectilinearGrid::new(
            ReferenceableAxis::regular("lon", lon0, dlon, nlon, true).unwrap(),
            ReferenceableAxis::regular("lat", lat0, dlat, nlat, false).unwrap(),
            CrsCode::Epsg4326,
        )
        .unwrap()
        .into()
    }

    fn collect_pairs(map: &PixelMap) -> Vec<(usize, usize, usize)> {
        map.entries()
            .flat_map(|e| e.targets().map(move |t| (e.i(), e.j(), t)))
            .collect()
    }

    #[test]
    fn test_identity_grid() {
        let grid = lon_lat_grid(0.0, 1.0, 4, 0.0, 1.0, 3);
        let map = PixelMap::for_grid(&grid, &grid).unwrap();

        assert_eq!(map.len(), 12);
        assert_eq!(map.target_domain_size(), 12);
        assert_eq!(map.num_unique_ij_pairs(), 12);
        assert_eq!(map.bounding_box_size(), 12);
        for entry in map.entries() {
            let targets: Vec<usize> = entry.targets().collect();
            assert_eq!(targets, vec![entry.j() * 4 + entry.i()]);
        }
    }

    #[test]
    fn test_entries_group_and_sort() {
        // Coarse 2x2 source, fine 4x4 target: each source cell gets 4 targets
        let source = lon_lat_grid(0.5, 1.0, 2, 0.5, 1.0, 2);
        let target = lon_lat_grid(0.25, 0.5, 4, 0.25, 0.5, 4);
        let map = PixelMap::for_grid(&source, &target).unwrap();

        assert_eq!(map.len(), 16);
        assert_eq!(map.num_unique_ij_pairs(), 4);

        let entries: Vec<_> = map.entries().collect();
        let cells: Vec<(usize, usize)> = entries.iter().map(|e| (e.i(), e.j())).collect();
        assert_eq!(cells, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);

        let first: Vec<usize> = entries[0].targets().collect();
        assert_eq!(first, vec![0, 1, 4, 5]);
        let last: Vec<usize> = entries[3].targets().collect();
        assert_eq!(last, vec![10, 11, 14, 15]);
    }

    #[test]
    fn test_pair_count_and_unique_targets() {
        let source = lon_lat_grid(-179.5, 1.0, 360, -89.5, 1.0, 180);
        let target = lon_lat_grid(-30.0, 0.7, 37, 60.0, -0.9, 29);
        let map = PixelMap::for_grid(&source, &target).unwrap();

        let total: usize = map.entries().map(|e| e.num_targets()).sum();
        assert_eq!(total, map.len());

        let mut seen = HashSet::new();
        let mut previous = None;
        for entry in map.entries() {
            let key = (entry.j(), entry.i());
            if let Some(prev) = previous {
                assert!(key > prev, "entries must be strictly increasing");
            }
            previous = Some(key);
            for t in entry.targets() {
                assert!(t < map.target_domain_size());
                assert!(seen.insert(t), "target {} appears twice", t);
            }
        }
    }

    #[test]
    fn test_fast_path_matches_list_path() {
        let source = lon_lat_grid(0.0, 0.25, 200, -10.0, 0.3, 90);
        let target = lon_lat_grid(-5.0, 0.37, 160, 20.0, -0.41, 80);
        let positions: Vec<_> = target.positions().collect();

        let fast = PixelMap::for_grid(&source, &target).unwrap();
        let general = PixelMap::for_list(&source, &positions).unwrap();

        assert_eq!(collect_pairs(&fast), collect_pairs(&general));
        assert_eq!(fast.index_bounds(), general.index_bounds());
    }

    #[test]
    fn test_bounds_cover_all_entries() {
        let source = lon_lat_grid(0.0, 1.0, 50, 0.0, 1.0, 40);
        let positions = vec![
            HorizontalPosition::lon_lat(12.2, 7.9),
            HorizontalPosition::lon_lat(30.4, 3.1),
            HorizontalPosition::lon_lat(5.0, 22.0),
            HorizontalPosition::lon_lat(500.0, 900.0),
        ];
        let map = PixelMap::for_list(&source, &positions).unwrap();

        assert_eq!(map.len(), 3);
        let bounds = map.index_bounds().unwrap();
        assert_eq!((bounds.min_i, bounds.max_i), (5, 30));
        assert_eq!((bounds.min_j, bounds.max_j), (3, 22));
        assert_eq!(map.bounding_box_size(), 26 * 20);
        assert!(map.bounding_box_size() >= map.num_unique_ij_pairs() as u64);
        for entry in map.entries() {
            assert!(entry.i() >= bounds.min_i && entry.i() <= bounds.max_i);
            assert!(entry.j() >= bounds.min_j && entry.j() <= bounds.max_j);
        }
    }

    #[test]
    fn test_scanlines() {
        let source = lon_lat_grid(0.0, 1.0, 10, 0.0, 1.0, 10);
        let positions = vec![
            HorizontalPosition::lon_lat(7.0, 2.0),
            HorizontalPosition::lon_lat(1.0, 2.0),
            HorizontalPosition::lon_lat(4.0, 5.0),
            HorizontalPosition::lon_lat(1.0, 2.0),
        ];
        let map = PixelMap::for_list(&source, &positions).unwrap();
        let scanlines: Vec<_> = map.scanlines().collect();

        assert_eq!(scanlines.len(), 2);
        assert_eq!(scanlines[0].j(), 2);
        assert_eq!((scanlines[0].min_i(), scanlines[0].max_i()), (1, 7));
        assert_eq!(scanlines[0].entries().len(), 2);
        let shared: Vec<usize> = scanlines[0].entries()[0].targets().collect();
        assert_eq!(shared, vec![1, 3]);
        assert_eq!(scanlines[1].j(), 5);
        assert_eq!(map.sum_row_lengths(), 7 + 1);
    }

    #[test]
    fn test_out_of_range_latitudes_keep_alignment() {
        let source = lon_lat_grid(0.5, 1.0, 10, -89.5, 1.0, 180);
        // Target rows at 95, 89.5 and 84 degrees; the first row is skipped
        let target = lon_lat_grid(0.5, 1.0, 3, 95.0, -5.5, 3);
        let map = PixelMap::for_grid(&source, &target).unwrap();

        let targets: HashSet<usize> = map.entries().flat_map(|e| e.targets()).collect();
        assert_eq!(targets, (3..9).collect());
    }

    #[test]
    fn test_empty_map() {
        let source = lon_lat_grid(0.0, 1.0, 4, 0.0, 1.0, 3);
        let positions = vec![HorizontalPosition::lon_lat(10.0, 50.0)];
        let map = PixelMap::for_list(&source, &positions).unwrap();

        assert!(map.is_empty());
        assert_eq!(map.target_domain_size(), 1);
        assert_eq!(map.index_bounds(), None);
        assert_eq!(map.bounding_box_size(), 0);
        assert_eq!(map.entries().count(), 0);
        assert_eq!(map.sum_row_lengths(), 0);
    }

    #[test]
    fn test_domain_too_large() {
        let source = lon_lat_grid(0.0, 1.0, 4, 0.0, 1.0, 3);
        let target = lon_lat_grid(0.0, 0.001, 50_000, 0.0, 0.001, 50_000);
        let err = PixelMap::for_grid(&source, &target).unwrap_err();
        assert!(matches!(err, GridError::DomainTooLarge { size: 2_500_000_000, .. }));
    }

    #[test]
    fn test_compressed_widths() {
        let source = lon_lat_grid(0.0, 1.0, 4, 0.0, 1.0, 3);
        let map = PixelMap::for_grid(&source, &source).unwrap();
        // 12 pairs of one-byte indices
        assert_eq!(map.memory_bytes(), 24);
    }
}
