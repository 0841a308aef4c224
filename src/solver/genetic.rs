//! Genetic algorithm over stop permutations.
//!
//! Individuals are index orders into the input slice. Each generation keeps
//! an elite unchanged and breeds the rest with tournament selection, ordered
//! crossover and swap mutation.

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use tracing::debug;

use super::{CancelFlag, CostMatrix, SearchTrace, apply_order, distinct_pair};
use crate::cost::CostModel;
use crate::stop::Stop;
use crate::traits::RouteOptimizer;

#[derive(Debug, Clone)]
pub struct GeneticConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Share of each population copied unchanged into the next one.
    pub elite_fraction: f64,
    pub tournament_size: usize,
    pub mutation_rate: f64,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            elite_fraction: 0.1,
            tournament_size: 3,
            mutation_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GeneticAlgorithm {
    pub config: GeneticConfig,
    cancel: CancelFlag,
}

impl GeneticAlgorithm {
    pub fn new(config: GeneticConfig) -> Self {
        Self {
            config,
            cancel: CancelFlag::default(),
        }
    }

    /// Stops evolving once `cancel` is raised, keeping the best so far.
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Evolves index orders over `matrix` and reports the best individual of
    /// the final population along with the best cost of every generation.
    pub fn evolve(&self, matrix: &CostMatrix, rng: &mut dyn RngCore) -> SearchTrace {
        let n = matrix.len();
        let population_size = self.config.population_size.max(2);
        let elite_count = ((population_size as f64 * self.config.elite_fraction).round() as usize)
            .clamp(1, population_size);

        let mut population: Vec<Individual> = (0..population_size)
            .map(|_| {
                let mut order: Vec<usize> = (0..n).collect();
                order.shuffle(rng);
                Individual::new(order, matrix)
            })
            .collect();
        sort_by_cost(&mut population);

        let mut visited_costs = Vec::with_capacity(self.config.generations + 1);
        visited_costs.push(population[0].cost);

        for generation in 0..self.config.generations {
            if self.cancel.is_cancelled() {
                debug!(generation, "genetic search cancelled");
                break;
            }
            let mut next: Vec<Individual> = population[..elite_count].to_vec();

            while next.len() < population_size {
                let first = self.tournament(&population, rng);
                let second = self.tournament(&population, rng);
                let mut child = ordered_crossover(&first.order, &second.order, rng);
                if n >= 2 && rng.gen_bool(self.config.mutation_rate.clamp(0.0, 1.0)) {
                    let (a, b) = distinct_pair(n, rng);
                    child.swap(a, b);
                }
                next.push(Individual::new(child, matrix));
            }

            population = next;
            sort_by_cost(&mut population);
            visited_costs.push(population[0].cost);

            if generation % 25 == 0 {
                debug!(generation, best_cost = population[0].cost, "genetic generation");
            }
        }

        let best = population.swap_remove(0);
        SearchTrace {
            order: best.order,
            cost: best.cost,
            visited_costs,
        }
    }

    /// Lowest-cost individual among `tournament_size` random picks.
    fn tournament<'a>(
        &self,
        population: &'a [Individual],
        rng: &mut dyn RngCore,
    ) -> &'a Individual {
        let mut winner = &population[rng.gen_range(0..population.len())];
        for _ in 1..self.config.tournament_size.max(1) {
            let contender = &population[rng.gen_range(0..population.len())];
            if contender.cost < winner.cost {
                winner = contender;
            }
        }
        winner
    }
}

impl RouteOptimizer for GeneticAlgorithm {
    fn name(&self) -> &'static str {
        "genetic_algorithm"
    }

    fn optimize(&self, stops: &[Stop], cost: &CostModel, rng: &mut dyn RngCore) -> Vec<Stop> {
        if stops.len() < 2 {
            return stops.to_vec();
        }
        let matrix = CostMatrix::new(stops, cost);
        let trace = self.evolve(&matrix, rng);
        apply_order(stops, &trace.order)
    }
}

#[derive(Debug, Clone)]
struct Individual {
    order: Vec<usize>,
    cost: f64,
}

impl Individual {
    fn new(order: Vec<usize>, matrix: &CostMatrix) -> Self {
        let cost = matrix.tour_cost(&order);
        Self { order, cost }
    }
}

fn sort_by_cost(population: &mut [Individual]) {
    population.sort_by(|a, b| a.cost.total_cmp(&b.cost));
}

/// Ordered crossover: a random contiguous slice of `first` stays in place,
/// the remaining positions take the genes of `second` in their order.
fn ordered_crossover(first: &[usize], second: &[usize], rng: &mut dyn RngCore) -> Vec<usize> {
    let n = first.len();
    if n < 2 {
        return first.to_vec();
    }

    let start = rng.gen_range(0..n);
    let end = rng.gen_range(start..n);

    let mut child: Vec<Option<usize>> = vec![None; n];
    let mut placed = vec![false; n];
    for position in start..=end {
        child[position] = Some(first[position]);
        placed[first[position]] = true;
    }

    let mut donors = second.iter().copied().filter(|gene| !placed[*gene]);
    for slot in child.iter_mut().filter(|slot| slot.is_none()) {
        *slot = donors.next();
    }

    child.into_iter().flatten().collect()
}
