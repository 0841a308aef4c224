//! Haversine great-circle distance.
//!
//! Straight-line distance on a spherical Earth. Ignores roads entirely, so
//! it is only an approximation of how far a driver actually travels.

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate haversine distance between two points in kilometers.
///
/// Coordinates are not validated; NaN inputs yield NaN.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Same as [`distance_km`] for `(lat, lon)` tuples.
pub fn distance_between(from: (f64, f64), to: (f64, f64)) -> f64 {
    distance_km(from.0, from.1, to.0, to.1)
}
