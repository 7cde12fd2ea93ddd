//! Test data generators for synthetic grids and value fields.
//!
//! These generators create predictable, verifiable data so tests can check
//! that the value read for a cell is the value stored for that cell.

/// Creates a field where every value encodes its own cell index.
///
/// Each cell value is `10 * j + i` for `nx <= 10`, which makes small grids
/// readable; in general it is `j * 10^k + i` with `10^k >= nx`.
///
/// # Returns
///
/// A `Vec<f64>` in row-major order (row `j = 0` first).
///
/// # Example
///
/// ```
/// use test_utils::create_index_field;
///
/// let field = create_index_field(4, 3);
/// assert_eq!(field.len(), 12);
/// assert_eq!(field[5], 11.0);  // i=1, j=1
/// assert_eq!(field[11], 23.0); // i=3, j=2
/// ```
pub fn create_index_field(nx: usize, ny: usize) -> Vec<f64> {
    let mut scale = 10;
    while scale < nx {
        scale *= 10;
    }
    let mut data = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            data.push((j * scale + i) as f64);
        }
    }
    data
}

/// Creates a smooth temperature-like field in Kelvin.
///
/// Values vary from about 250K to 310K across the grid.
pub fn create_temperature_field(nx: usize, ny: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let x_factor = i as f64 / nx.max(1) as f64;
            let y_factor = j as f64 / ny.max(1) as f64;
            data.push(250.0 + x_factor * 30.0 + y_factor * 30.0);
        }
    }
    data
}

/// Creates a field with `missing` at every `every`-th cell.
///
/// Other cells hold their row-major index.
pub fn create_field_with_missing(nx: usize, ny: usize, every: usize, missing: f64) -> Vec<f64> {
    (0..nx * ny)
        .map(|k| {
            if every > 0 && k % every == 0 {
                missing
            } else {
                k as f64
            }
        })
        .collect()
}

/// Values `first + k * spacing` for `k` in `0..n`.
pub fn regular_values(first: f64, spacing: f64, n: usize) -> Vec<f64> {
    (0..n).map(|k| first + k as f64 * spacing).collect()
}

/// Row-major 2D longitude and latitude arrays of a regular lon/lat grid.
///
/// The result describes a rectilinear grid as if it were curvilinear.
pub fn rectilinear_coordinate_arrays(
    lon0: f64,
    dlon: f64,
    ni: usize,
    lat0: f64,
    dlat: f64,
    nj: usize,
) -> (Vec<f64>, Vec<f64>) {
    let mut lons = Vec::with_capacity(ni * nj);
    let mut lats = Vec::with_capacity(ni * nj);
    for j in 0..nj {
        for i in 0..ni {
            lons.push(lon0 + i as f64 * dlon);
            lats.push(lat0 + j as f64 * dlat);
        }
    }
    (lons, lats)
}

/// Row-major coordinate arrays of a grid rotated by `angle_deg` about
/// `(lon0, lat0)`.
///
/// Cell `(i, j)` sits at `(i * spacing, j * spacing)` before rotation, so
/// neighbouring rows are not aligned with latitude.
pub fn rotated_coordinate_arrays(
    lon0: f64,
    lat0: f64,
    spacing: f64,
    ni: usize,
    nj: usize,
    angle_deg: f64,
) -> (Vec<f64>, Vec<f64>) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let mut lons = Vec::with_capacity(ni * nj);
    let mut lats = Vec::with_capacity(ni * nj);
    for j in 0..nj {
        for i in 0..ni {
            let x = i as f64 * spacing;
            let y = j as f64 * spacing;
            lons.push(lon0 + x * cos - y * sin);
            lats.push(lat0 + x * sin + y * cos);
        }
    }
    (lons, lats)
}
