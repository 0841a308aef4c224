//! Route ordering heuristics.
//!
//! Four interchangeable strategies order the stops of a working route:
//! nearest neighbor (fast, deterministic), a genetic algorithm, simulated
//! annealing and tabu search. The stochastic ones draw all randomness from
//! the generator they are handed, so a seeded generator reproduces a run.

pub mod annealing;
pub mod genetic;
pub mod nearest_neighbor;
pub mod tabu;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cost::CostModel;
use crate::stop::Stop;
use crate::traits::RouteOptimizer;

pub use annealing::{AnnealingConfig, SimulatedAnnealing};
pub use genetic::{GeneticAlgorithm, GeneticConfig};
pub use nearest_neighbor::NearestNeighbor;
pub use tabu::{TabuConfig, TabuSearch};

/// Which heuristic orders the route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strategy {
    #[default]
    NearestNeighbor,
    GeneticAlgorithm,
    SimulatedAnnealing,
    TabuSearch,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::NearestNeighbor,
        Strategy::GeneticAlgorithm,
        Strategy::SimulatedAnnealing,
        Strategy::TabuSearch,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Strategy::NearestNeighbor => "Nearest Neighbor",
            Strategy::GeneticAlgorithm => "Genetic Algorithm",
            Strategy::SimulatedAnnealing => "Simulated Annealing",
            Strategy::TabuSearch => "Tabu Search",
        }
    }

    /// Orders `stops` with this strategy using its default tuning.
    pub fn optimize(self, stops: &[Stop], cost: &CostModel, rng: &mut dyn RngCore) -> Vec<Stop> {
        self.optimize_until(stops, cost, rng, &CancelFlag::default())
    }

    /// Like [`Strategy::optimize`], but the iterative searches stop early and
    /// return their best order so far once `cancel` is raised.
    pub fn optimize_until(
        self,
        stops: &[Stop],
        cost: &CostModel,
        rng: &mut dyn RngCore,
        cancel: &CancelFlag,
    ) -> Vec<Stop> {
        match self {
            Strategy::NearestNeighbor => run_optimizer(&NearestNeighbor, stops, cost, rng),
            Strategy::GeneticAlgorithm => {
                let optimizer = GeneticAlgorithm::default().with_cancel(cancel.clone());
                run_optimizer(&optimizer, stops, cost, rng)
            }
            Strategy::SimulatedAnnealing => {
                let optimizer = SimulatedAnnealing::default().with_cancel(cancel.clone());
                run_optimizer(&optimizer, stops, cost, rng)
            }
            Strategy::TabuSearch => {
                let optimizer = TabuSearch::default().with_cancel(cancel.clone());
                run_optimizer(&optimizer, stops, cost, rng)
            }
        }
    }
}

/// Stop signal shared between a running search and whoever started it.
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Runs an optimizer with timing and cost logging around it.
pub fn run_optimizer<O>(
    optimizer: &O,
    stops: &[Stop],
    cost: &CostModel,
    rng: &mut dyn RngCore,
) -> Vec<Stop>
where
    O: RouteOptimizer + ?Sized,
{
    if stops.len() < 2 {
        return stops.to_vec();
    }

    let started_at = Instant::now();
    let before = cost.cost(stops);
    let route = optimizer.optimize(stops, cost, rng);
    let after = cost.cost(&route);

    info!(
        strategy = optimizer.name(),
        stops = stops.len(),
        cost_before = before,
        cost_after = after,
        elapsed_ms = started_at.elapsed().as_millis() as u64,
        "route optimized"
    );

    route
}

// ============================================================================
// Shared search plumbing
// ============================================================================

/// Precomputed leg costs between every pair of stops, indexed by position in
/// the input slice.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    legs: Vec<Vec<f64>>,
}

impl CostMatrix {
    pub fn new(stops: &[Stop], cost: &CostModel) -> Self {
        let legs = stops
            .par_iter()
            .map(|from| stops.iter().map(|to| cost.leg_cost(from, to)).collect())
            .collect();
        debug!(stops = stops.len(), "cost matrix built");
        Self { legs }
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn leg(&self, from: usize, to: usize) -> f64 {
        self.legs[from][to]
    }

    /// Cost of visiting stops in the given index order. Matches
    /// [`CostModel::cost`] on the reordered stops.
    pub fn tour_cost(&self, order: &[usize]) -> f64 {
        order.windows(2).map(|leg| self.legs[leg[0]][leg[1]]).sum()
    }
}

/// Result of a stochastic search over index orders.
#[derive(Debug, Clone)]
pub struct SearchTrace {
    /// Best order found.
    pub order: Vec<usize>,
    /// Cost of `order`.
    pub cost: f64,
    /// Cost of every state the search stood on, starting state first. For
    /// the genetic algorithm: best cost of each population, initial first.
    pub visited_costs: Vec<f64>,
}

/// Materializes an index order into stops.
pub fn apply_order(stops: &[Stop], order: &[usize]) -> Vec<Stop> {
    order.iter().map(|&index| stops[index].clone()).collect()
}

/// Picks two distinct positions in `0..len`. Requires `len >= 2`.
pub(crate) fn distinct_pair(len: usize, rng: &mut dyn RngCore) -> (usize, usize) {
    use rand::Rng;

    let first = rng.gen_range(0..len);
    let mut second = rng.gen_range(0..len - 1);
    if second >= first {
        second += 1;
    }
    (first, second)
}
