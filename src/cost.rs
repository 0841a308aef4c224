//! Route cost model.
//!
//! The cost of a route is the sum of great-circle leg distances. When
//! optimizing for time every leg is multiplied by [`TIME_FACTOR`], a crude
//! stand-in for travel time: there is no road network, no speed limits and
//! no traffic behind it.

use serde::{Deserialize, Serialize};

use crate::stop::Stop;

/// Multiplier applied to each leg when optimizing for time.
pub const TIME_FACTOR: f64 = 1.5;

/// Objective used to compare candidate orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizeFor {
    #[default]
    Time,
    Distance,
}

impl OptimizeFor {
    fn leg_factor(self) -> f64 {
        match self {
            OptimizeFor::Time => TIME_FACTOR,
            OptimizeFor::Distance => 1.0,
        }
    }
}

/// Sum of consecutive leg distances, scaled for [`OptimizeFor::Time`].
///
/// Empty and single-stop routes cost 0.
pub fn route_cost(stops: &[Stop], optimize_for: OptimizeFor) -> f64 {
    let model = CostModel::new(optimize_for);
    stops.windows(2).map(|leg| model.leg_cost(&leg[0], &leg[1])).sum()
}

/// Cost function handed to the optimizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CostModel {
    pub optimize_for: OptimizeFor,
}

impl CostModel {
    pub fn new(optimize_for: OptimizeFor) -> Self {
        Self { optimize_for }
    }

    /// Cost of travelling directly from one stop to the next.
    pub fn leg_cost(&self, from: &Stop, to: &Stop) -> f64 {
        from.distance_to(to) * self.optimize_for.leg_factor()
    }

    pub fn cost(&self, stops: &[Stop]) -> f64 {
        route_cost(stops, self.optimize_for)
    }
}
