//! Distances in a navigation frame.

use super::{CoordinateConvertor, Point3, SrsType};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Distance between two navigation-frame points.
///
/// Euclidean for cartesian and projected frames, geodesic (via the
/// convertor) for geographic ones. Any NaN coordinate yields NaN, which
/// compares false against every threshold.
pub fn distance(convertor: &dyn CoordinateConvertor, a: Point3, b: Point3) -> f64 {
    if a.iter().chain(b.iter()).any(|v| v.is_nan()) {
        return f64::NAN;
    }
    match convertor.nav_srs_type() {
        SrsType::Cartesian | SrsType::Projected => {
            let dx = b[0] - a[0];
            let dy = b[1] - a[1];
            let dz = b[2] - a[2];
            (dx * dx + dy * dy + dz * dz).sqrt()
        }
        SrsType::Geographic => convertor.geo_distance(a, b),
    }
}

/// Great-circle distance in meters between `[lon, lat, _]` points (degrees).
pub fn haversine_distance(a: Point3, b: Point3) -> f64 {
    let lat1 = a[1].to_radians();
    let lat2 = b[1].to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b[0] - a[0]).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}
