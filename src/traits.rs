//! Seams between the planner and the rest of the application.
//!
//! The planner does not own stops; it asks a [`StopSource`] for them. The
//! route ordering heuristics all sit behind [`RouteOptimizer`].

use rand::RngCore;

use crate::cost::CostModel;
use crate::stop::{Stop, StopId};

/// Supplies stops from wherever the application keeps them.
pub trait StopSource {
    /// Looks up a single stop.
    fn stop_by_id(&self, id: StopId) -> Option<Stop>;
}

impl StopSource for [Stop] {
    fn stop_by_id(&self, id: StopId) -> Option<Stop> {
        self.iter().find(|stop| stop.id() == id).cloned()
    }
}

impl StopSource for Vec<Stop> {
    fn stop_by_id(&self, id: StopId) -> Option<Stop> {
        self.as_slice().stop_by_id(id)
    }
}

/// Orders a set of stops so that the route cost is low.
///
/// Implementations must return a permutation of the input: same stops, no
/// duplicates, nothing dropped. Inputs with fewer than two stops come back
/// unchanged.
pub trait RouteOptimizer {
    /// Human readable name for logs.
    fn name(&self) -> &'static str;

    fn optimize(&self, stops: &[Stop], cost: &CostModel, rng: &mut dyn RngCore) -> Vec<Stop>;
}
