//! Longitude arithmetic on the periodic 360 degree axis.

/// Map a longitude into `[0, 360)`.
pub fn constrain_longitude_360(value: f64) -> f64 {
    let v = value % 360.0;
    if v < 0.0 {
        v + 360.0
    } else {
        v
    }
}

/// Map a longitude into `(-180, 180]`.
pub fn constrain_longitude_180(value: f64) -> f64 {
    let v = constrain_longitude_360(value);
    if v > 180.0 {
        v - 360.0
    } else {
        v
    }
}

/// Smallest longitude equivalent to `target` that is `>= reference`.
///
/// The result lies in `[reference, reference + 360)`.
pub fn next_equivalent_longitude(reference: f64, target: f64) -> f64 {
    reference + constrain_longitude_360(target - reference)
}

/// Longitude equivalent to `lon` that lies closest to `target`.
///
/// Ties resolve to the equivalent at or above `target`.
pub fn nearest_equivalent_longitude(target: f64, lon: f64) -> f64 {
    let above = next_equivalent_longitude(target, lon);
    let below = above - 360.0;
    if above - target <= target - below {
        above
    } else {
        below
    }
}
