//! Greedy nearest-neighbor ordering.

use rand::RngCore;

use crate::cost::CostModel;
use crate::stop::Stop;
use crate::traits::RouteOptimizer;

/// Starts at the first stop and always drives to the closest unvisited one.
///
/// Deterministic for a given input order. O(n²).
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbor;

impl RouteOptimizer for NearestNeighbor {
    fn name(&self) -> &'static str {
        "nearest_neighbor"
    }

    fn optimize(&self, stops: &[Stop], _cost: &CostModel, _rng: &mut dyn RngCore) -> Vec<Stop> {
        nearest_neighbor(stops)
    }
}

/// Nearest-neighbor ordering by great-circle distance.
///
/// Ties go to the stop that comes first in the remaining list.
pub fn nearest_neighbor(stops: &[Stop]) -> Vec<Stop> {
    if stops.len() < 2 {
        return stops.to_vec();
    }

    let mut remaining: Vec<&Stop> = stops.iter().collect();
    let mut route = Vec::with_capacity(stops.len());

    let mut current = remaining.remove(0);
    route.push(current.clone());

    while !remaining.is_empty() {
        let mut nearest = 0;
        let mut nearest_distance = f64::INFINITY;
        for (index, candidate) in remaining.iter().enumerate() {
            let distance = current.distance_to(candidate);
            if distance < nearest_distance {
                nearest = index;
                nearest_distance = distance;
            }
        }

        current = remaining.remove(nearest);
        route.push(current.clone());
    }

    route
}
