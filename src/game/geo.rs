//! Great-circle distance on a spherical Earth.

use geoutils::Location as GeoPoint;

use super::types::Coordinates;

/// Haversine distance between `a` and `b`, in kilometres (Earth radius 6371 km).
///
/// Symmetric in its arguments; identical points give exactly `0.0`. Non-finite
/// input yields NaN.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    if a == b {
        return 0.0;
    }
    let from = GeoPoint::new(a.lat, a.lng);
    let to = GeoPoint::new(b.lat, b.lng);
    from.haversine_distance_to(&to).meters() / 1000.0
}
