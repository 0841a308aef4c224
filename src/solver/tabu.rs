//! Tabu search over pairwise swaps.
//!
//! Every iteration evaluates all O(n²) swap neighbours of the current order,
//! so a run costs O(iterations · n³) with full re-evaluation. Fine for a
//! delivery round, not for hundreds of stops.

use std::collections::VecDeque;

use rand::RngCore;
use tracing::debug;

use super::{CancelFlag, CostMatrix, SearchTrace, apply_order};
use crate::cost::CostModel;
use crate::stop::Stop;
use crate::traits::RouteOptimizer;

#[derive(Debug, Clone)]
pub struct TabuConfig {
    pub iterations: usize,
    /// Number of recent orders that may not be revisited.
    pub tabu_size: usize,
}

impl Default for TabuConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            tabu_size: 10,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TabuSearch {
    pub config: TabuConfig,
    cancel: CancelFlag,
}

/// Bounded FIFO of recently visited orders.
#[derive(Debug)]
struct TabuList {
    entries: VecDeque<Vec<usize>>,
    capacity: usize,
}

impl TabuList {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    fn contains(&self, order: &[usize]) -> bool {
        self.entries.iter().any(|entry| entry.as_slice() == order)
    }

    fn push(&mut self, order: Vec<usize>) {
        if self.capacity == 0 {
            return;
        }
        self.entries.push_back(order);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }
}

impl TabuSearch {
    pub fn new(config: TabuConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::default(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Searches from the identity order and returns the best order seen.
    pub fn search(&self, matrix: &CostMatrix) -> SearchTrace {
        let n = matrix.len();
        let mut current: Vec<usize> = (0..n).collect();
        let mut best = current.clone();
        let mut best_cost = matrix.tour_cost(&current);

        let mut visited_costs = Vec::with_capacity(self.config.iterations + 1);
        visited_costs.push(best_cost);

        let mut tabu = TabuList::new(self.config.tabu_size);
        tabu.push(current.clone());

        for iteration in 0..self.config.iterations {
            if self.cancel.is_cancelled() {
                debug!(iteration, "tabu search cancelled");
                break;
            }
            let Some((next, next_cost)) = best_admissible_neighbour(&current, matrix, &tabu) else {
                continue;
            };

            current = next;
            tabu.push(current.clone());
            visited_costs.push(next_cost);

            if next_cost < best_cost {
                best_cost = next_cost;
                best.clone_from(&current);
            }
        }

        SearchTrace { order: best, cost: best_cost, visited_costs }
    }
}

/// Cheapest swap neighbour of `current` that is not tabu.
fn best_admissible_neighbour(
    current: &[usize],
    matrix: &CostMatrix,
    tabu: &TabuList,
) -> Option<(Vec<usize>, f64)> {
    let n = current.len();
    let mut candidate = current.to_vec();
    let mut chosen: Option<(usize, usize, f64)> = None;

    for i in 0..n {
        for j in i + 1..n {
            candidate.swap(i, j);
            if !tabu.contains(&candidate) {
                let cost = matrix.tour_cost(&candidate);
                if chosen.is_none_or(|(_, _, best)| cost < best) {
                    chosen = Some((i, j, cost));
                }
            }
            candidate.swap(i, j);
        }
    }

    chosen.map(|(i, j, cost)| {
        candidate.swap(i, j);
        (candidate, cost)
    })
}

impl RouteOptimizer for TabuSearch {
    fn name(&self) -> &'static str {
        "tabu_search"
    }

    fn optimize(&self, stops: &[Stop], cost: &CostModel, _rng: &mut dyn RngCore) -> Vec<Stop> {
        if stops.len() < 2 {
            return stops.to_vec();
        }
        let matrix = CostMatrix::new(stops, cost);
        let trace = self.search(&matrix);
        apply_order(stops, &trace.order)
    }
}
