//! Longitude arithmetic over a sweep of inputs.

use geo_common::{
    constrain_longitude_180, constrain_longitude_360, nearest_equivalent_longitude,
    next_equivalent_longitude, BoundingBox, CrsCode, HorizontalPosition,
};

#[test]
fn test_constrain_ranges_hold_for_sweep() {
    let mut lon = -1080.0;
    while lon <= 1080.0 {
        let c360 = constrain_longitude_360(lon);
        assert!((0.0..360.0).contains(&c360), "{} -> {}", lon, c360);

        let c180 = constrain_longitude_180(lon);
        assert!(c180 > -180.0 && c180 <= 180.0, "{} -> {}", lon, c180);
        lon += 7.5;
    }
}

#[test]
fn test_next_equivalent_is_within_one_turn() {
    for reference in [-180.0, -37.5, 0.0, 95.25] {
        for target in [-400.0, -180.0, -1.0, 0.0, 45.0, 359.0, 720.5] {
            let lon = next_equivalent_longitude(reference, target);
            assert!(lon >= reference && lon < reference + 360.0);
            assert_eq!(
                constrain_longitude_360(lon),
                constrain_longitude_360(target)
            );
        }
    }
}

#[test]
fn test_nearest_equivalent_is_within_half_turn() {
    for target in [-170.0, 0.0, 179.5] {
        for lon in [-179.5, -90.0, 0.0, 90.0, 180.0, 270.0] {
            let eq = nearest_equivalent_longitude(target, lon);
            assert!((eq - target).abs() <= 180.0);
        }
    }
}

#[test]
fn test_position_helpers() {
    let p = HorizontalPosition::lon_lat(10.0, 20.0);
    assert_eq!(p.crs, CrsCode::Epsg4326);
    assert!(!p.is_missing());
    assert!(HorizontalPosition::lon_lat(f64::NAN, 0.0).is_missing());
}

#[test]
fn test_bbox_enclosing_and_size() {
    let bbox = BoundingBox::enclosing(vec![(0.0, 0.0), (4.0, -2.0), (1.0, 3.0)]).unwrap();
    assert_eq!(bbox.width(), 4.0);
    assert_eq!(bbox.height(), 5.0);
}
