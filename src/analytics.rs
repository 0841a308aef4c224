//! Summary numbers for a finished path.

use serde::{Deserialize, Serialize};

use crate::cost::{OptimizeFor, TIME_FACTOR, route_cost};
use crate::stop::Stop;

/// Derived summary of a complete path.
///
/// Distance is always the plain great-circle total, whichever objective the
/// route was optimized for.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAnalytics {
    pub total_distance_km: f64,
    /// Rough driving time in minutes.
    pub estimated_time_minutes: u32,
    pub total_stops: usize,
    /// Kilometers per stop; 0 for paths with fewer than two stops.
    pub efficiency_km_per_stop: f64,
}

impl RouteAnalytics {
    pub fn compute(path: &[Stop]) -> Self {
        let total_distance_km = route_cost(path, OptimizeFor::Distance);
        let total_stops = path.len();
        let efficiency_km_per_stop = if total_stops > 1 {
            total_distance_km / total_stops as f64
        } else {
            0.0
        };

        Self {
            total_distance_km,
            estimated_time_minutes: estimated_minutes(total_distance_km),
            total_stops,
            efficiency_km_per_stop,
        }
    }

    /// Leg-by-leg breakdown of `path`.
    pub fn legs(path: &[Stop]) -> Vec<Leg<'_>> {
        path.windows(2)
            .map(|pair| Leg {
                from: &pair[0],
                to: &pair[1],
                distance_km: pair[0].distance_to(&pair[1]),
            })
            .collect()
    }
}

/// One hop between consecutive stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg<'a> {
    pub from: &'a Stop,
    pub to: &'a Stop,
    pub distance_km: f64,
}

/// Minutes for a distance, using the same 1.5 factor as the time objective.
pub fn estimated_minutes(distance_km: f64) -> u32 {
    let minutes = (distance_km * TIME_FACTOR).round();
    if minutes.is_finite() && minutes > 0.0 {
        minutes as u32
    } else {
        0
    }
}
