//! Deep links into an external map application.

use reqwest::Url;

use crate::error::{PlannerError, Result};
use crate::stop::Stop;

const DIRECTIONS_BASE_URL: &str = "https://www.google.com/maps/dir/";

/// Directions link with every stop of `path` as a `|`-joined waypoint.
///
/// Returns `None` for an empty path.
pub fn directions_url(path: &[Stop]) -> Result<Option<Url>> {
    if path.is_empty() {
        return Ok(None);
    }

    let waypoints = path
        .iter()
        .map(|stop| format!("{},{}", stop.latitude(), stop.longitude()))
        .collect::<Vec<_>>()
        .join("|");

    let params = [("api", "1"), ("waypoints", waypoints.as_str())];
    let url = Url::parse_with_params(DIRECTIONS_BASE_URL, &params)
        .map_err(|err| PlannerError::MapLink(err.to_string()))?;
    Ok(Some(url))
}

/// `geo:` URI pointing at a single stop, labelled with its name.
pub fn geo_uri(stop: &Stop) -> Result<Url> {
    let position = format!("{},{}", stop.latitude(), stop.longitude());
    let label = format!("{}({})", position, stop.name());
    Url::parse_with_params(&format!("geo:{}", position), &[("q", label.as_str())])
        .map_err(|err| PlannerError::MapLink(err.to_string()))
}
