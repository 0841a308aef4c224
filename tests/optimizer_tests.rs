//! Route ordering tests on synthetic grids and real Las Vegas stops.

mod fixtures;

use std::collections::HashSet;

use rand::SeedableRng;
use rand::rngs::SmallRng;

use route_planner::cost::{CostModel, OptimizeFor};
use route_planner::haversine;
use route_planner::solver::nearest_neighbor::nearest_neighbor;
use route_planner::solver::{CostMatrix, GeneticAlgorithm, SimulatedAnnealing, Strategy, TabuSearch};
use route_planner::stop::{Stop, StopId};

use fixtures::las_vegas_locations::{self, CUSTOMERS, STRIP_RESTAURANTS};

// ============================================================================
// Helpers
// ============================================================================

fn stop(id: i64, lat: f64, lon: f64) -> Stop {
    Stop::new(StopId(id), format!("stop-{}", id), lat, lon).unwrap()
}

fn ids(stops: &[Stop]) -> Vec<i64> {
    stops.iter().map(|stop| stop.id().0).collect()
}

fn assert_permutation(input: &[Stop], output: &[Stop]) {
    assert_eq!(input.len(), output.len(), "stop count changed");
    let expected: HashSet<StopId> = input.iter().map(Stop::id).collect();
    let actual: HashSet<StopId> = output.iter().map(Stop::id).collect();
    assert_eq!(actual.len(), output.len(), "duplicate stop in output");
    assert_eq!(expected, actual, "stop set changed");
}

fn min_cost(costs: &[f64]) -> f64 {
    costs.iter().copied().fold(f64::INFINITY, f64::min)
}

// ============================================================================
// Nearest neighbor
// ============================================================================

#[test]
fn test_nearest_neighbor_walks_square_sides() {
    let a = stop(1, 0.0, 0.0);
    let b = stop(2, 0.0, 1.0);
    let c = stop(3, 1.0, 1.0);
    let d = stop(4, 1.0, 0.0);

    let route = nearest_neighbor(&[a.clone(), c.clone(), b.clone(), d.clone()]);
    assert_eq!(route[0].id(), a.id(), "first input stop starts the route");

    let sides = a.distance_to(&b) + b.distance_to(&c) + c.distance_to(&d);
    let total: f64 = route.windows(2).map(|leg| leg[0].distance_to(&leg[1])).sum();
    assert!((total - sides).abs() < 1e-9, "route used a diagonal: {:?}", ids(&route));
    assert_eq!(ids(&route), vec![1, 2, 3, 4]);
}

#[test]
fn test_nearest_neighbor_on_strip_restaurants() {
    let stops = las_vegas_locations::stops(STRIP_RESTAURANTS, 1);
    let route = nearest_neighbor(&stops);
    assert_permutation(&stops, &route);

    // Every step goes to the closest stop not yet visited.
    for (position, window) in route.windows(2).enumerate() {
        let step = window[0].distance_to(&window[1]);
        for later in &route[position + 1..] {
            assert!(step <= window[0].distance_to(later) + 1e-12);
        }
    }
}

// ============================================================================
// All strategies
// ============================================================================

#[test]
fn test_every_strategy_returns_permutation_of_catalogue() {
    let stops = las_vegas_locations::catalogue();
    for optimize_for in [OptimizeFor::Time, OptimizeFor::Distance] {
        let cost = CostModel::new(optimize_for);
        for strategy in Strategy::ALL {
            let mut rng = SmallRng::seed_from_u64(7);
            let route = strategy.optimize(&stops, &cost, &mut rng);
            assert_permutation(&stops, &route);
        }
    }
}

#[test]
fn test_trivial_inputs_are_returned_unchanged() {
    let cost = CostModel::default();
    let single = vec![stop(1, 36.1, -115.1)];
    for strategy in Strategy::ALL {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(strategy.optimize(&[], &cost, &mut rng).is_empty());
        assert_eq!(ids(&strategy.optimize(&single, &cost, &mut rng)), vec![1]);
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let stops = las_vegas_locations::stops(CUSTOMERS, 100);
    let cost = CostModel::default();
    for strategy in [Strategy::GeneticAlgorithm, Strategy::SimulatedAnnealing] {
        let first = strategy.optimize(&stops, &cost, &mut SmallRng::seed_from_u64(42));
        let second = strategy.optimize(&stops, &cost, &mut SmallRng::seed_from_u64(42));
        assert_eq!(ids(&first), ids(&second), "{} differs between seeded runs", strategy.label());
    }
}

// ============================================================================
// Search traces
// ============================================================================

#[test]
fn test_annealing_keeps_best_state_seen() {
    let stops = las_vegas_locations::catalogue();
    let matrix = CostMatrix::new(&stops, &CostModel::default());
    let trace = SimulatedAnnealing::default().anneal(&matrix, &mut SmallRng::seed_from_u64(3));

    assert!(trace.cost <= trace.visited_costs[0]);
    assert!((trace.cost - min_cost(&trace.visited_costs)).abs() < 1e-9);
    assert!((matrix.tour_cost(&trace.order) - trace.cost).abs() < 1e-9);
}

#[test]
fn test_tabu_keeps_best_state_seen() {
    let stops = las_vegas_locations::stops(CUSTOMERS, 1);
    let matrix = CostMatrix::new(&stops, &CostModel::new(OptimizeFor::Distance));
    let trace = TabuSearch::default().search(&matrix);

    assert!(trace.cost <= trace.visited_costs[0]);
    assert!((trace.cost - min_cost(&trace.visited_costs)).abs() < 1e-9);
    assert!((matrix.tour_cost(&trace.order) - trace.cost).abs() < 1e-9);
}

#[test]
fn test_genetic_best_never_worsens() {
    let stops = las_vegas_locations::catalogue();
    let matrix = CostMatrix::new(&stops, &CostModel::default());
    let trace = GeneticAlgorithm::default().evolve(&matrix, &mut SmallRng::seed_from_u64(11));

    for pair in trace.visited_costs.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-9, "best cost went up: {} -> {}", pair[0], pair[1]);
    }
    assert!((trace.cost - min_cost(&trace.visited_costs)).abs() < 1e-9);
}

#[test]
fn test_cost_matrix_matches_haversine() {
    let stops = las_vegas_locations::stops(STRIP_RESTAURANTS, 1);
    let matrix = CostMatrix::new(&stops, &CostModel::new(OptimizeFor::Distance));
    let expected = haversine::distance_between(stops[0].coords(), stops[3].coords());
    assert!((matrix.leg(0, 3) - expected).abs() < 1e-12);
    assert_eq!(matrix.leg(2, 2), 0.0);
}
