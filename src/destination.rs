//! Picks the stop a route should end at.

use tracing::debug;

use crate::haversine;
use crate::stop::Stop;

/// Name fragments that mark a stop as the intended end of a route.
const DESTINATION_MARKERS: [&str; 3] = ["FINAL", "DESTINATION", "END"];

/// Suggests the final destination among `stops`.
///
/// A stop whose name contains one of the marker words (case-insensitive)
/// wins; otherwise the stop farthest from the centroid of all stops. Ties
/// resolve to the earliest stop.
pub fn detect_final_destination(stops: &[Stop]) -> Option<Stop> {
    if stops.is_empty() {
        return None;
    }

    if let Some(named) = stops.iter().find(|stop| is_marked_as_destination(stop.name())) {
        debug!(stop = %named.id(), "final destination chosen by name");
        return Some(named.clone());
    }

    let (centroid_lat, centroid_lon) = centroid(stops);
    let mut farthest = &stops[0];
    let mut farthest_distance = f64::NEG_INFINITY;
    for stop in stops {
        let distance =
            haversine::distance_between((centroid_lat, centroid_lon), stop.coords());
        if distance > farthest_distance {
            farthest = stop;
            farthest_distance = distance;
        }
    }

    debug!(
        stop = %farthest.id(),
        distance_km = farthest_distance,
        "final destination chosen by distance"
    );
    Some(farthest.clone())
}

fn is_marked_as_destination(name: &str) -> bool {
    let upper = name.to_uppercase();
    DESTINATION_MARKERS.iter().any(|marker| upper.contains(marker))
}

/// Arithmetic mean of latitudes and longitudes.
fn centroid(stops: &[Stop]) -> (f64, f64) {
    let count = stops.len() as f64;
    let lat = stops.iter().map(Stop::latitude).sum::<f64>() / count;
    let lon = stops.iter().map(Stop::longitude).sum::<f64>() / count;
    (lat, lon)
}
