//! Simulated annealing with pairwise-swap moves.

use rand::{Rng, RngCore};
use tracing::debug;

use super::{CancelFlag, CostMatrix, SearchTrace, apply_order, distinct_pair};
use crate::cost::CostModel;
use crate::stop::Stop;
use crate::traits::RouteOptimizer;

#[derive(Debug, Clone)]
pub struct AnnealingConfig {
    pub initial_temperature: f64,
    /// Multiplier applied to the temperature after every iteration.
    pub cooling_rate: f64,
    pub iterations: usize,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            cooling_rate: 0.95,
            iterations: 1000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedAnnealing {
    pub config: AnnealingConfig,
    cancel: CancelFlag,
}

impl SimulatedAnnealing {
    pub fn new(config: AnnealingConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::default(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Anneals from the identity order and returns the best order seen.
    pub fn anneal(&self, matrix: &CostMatrix, rng: &mut dyn RngCore) -> SearchTrace {
        let n = matrix.len();
        let mut current: Vec<usize> = (0..n).collect();
        let mut current_cost = matrix.tour_cost(&current);
        let mut best = current.clone();
        let mut best_cost = current_cost;

        let mut visited_costs = Vec::with_capacity(self.config.iterations + 1);
        visited_costs.push(current_cost);

        if n < 2 {
            return SearchTrace { order: best, cost: best_cost, visited_costs };
        }

        let mut temperature = self.config.initial_temperature;
        for iteration in 0..self.config.iterations {
            if self.cancel.is_cancelled() {
                debug!(iteration, "annealing cancelled");
                break;
            }
            let (a, b) = distinct_pair(n, rng);
            current.swap(a, b);
            let candidate_cost = matrix.tour_cost(&current);

            if accept(current_cost, candidate_cost, temperature, rng) {
                current_cost = candidate_cost;
                if current_cost < best_cost {
                    best_cost = current_cost;
                    best.clone_from(&current);
                }
            } else {
                current.swap(a, b);
            }

            visited_costs.push(current_cost);
            temperature *= self.config.cooling_rate;
        }

        SearchTrace { order: best, cost: best_cost, visited_costs }
    }
}

/// Metropolis criterion: always take an improvement, take a worse state with
/// probability `exp((current - candidate) / temperature)`.
fn accept(current_cost: f64, candidate_cost: f64, temperature: f64, rng: &mut dyn RngCore) -> bool {
    if candidate_cost < current_cost {
        return true;
    }
    let probability = ((current_cost - candidate_cost) / temperature).exp();
    rng.r#gen::<f64>() < probability
}

impl RouteOptimizer for SimulatedAnnealing {
    fn name(&self) -> &'static str {
        "simulated_annealing"
    }

    fn optimize(&self, stops: &[Stop], cost: &CostModel, rng: &mut dyn RngCore) -> Vec<Stop> {
        if stops.len() < 2 {
            return stops.to_vec();
        }
        let matrix = CostMatrix::new(stops, cost);
        let trace = self.anneal(&matrix, rng);
        apply_order(stops, &trace.order)
    }
}
