//! Session-wide route configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cost::{CostModel, OptimizeFor};
use crate::error::{PlannerError, Result};
use crate::solver::Strategy;

/// Options applied to the next optimization run.
///
/// `max_stops`, the avoidance flags and `vehicle_capacity_kg` are carried for
/// the settings screen and the saved state, but no strategy reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteOptions {
    pub max_stops: usize,
    pub avoid_tolls: bool,
    pub avoid_highways: bool,
    pub avoid_ferries: bool,
    pub optimize_for: OptimizeFor,
    pub strategy: Strategy,
    pub vehicle_capacity_kg: u32,
    /// Fixed seed for the stochastic strategies; fresh entropy when unset.
    pub seed: Option<u64>,
    /// How long to wait for a background run before falling back to nearest
    /// neighbor.
    pub timeout_ms: u64,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            max_stops: 10,
            avoid_tolls: false,
            avoid_highways: false,
            avoid_ferries: false,
            optimize_for: OptimizeFor::Time,
            strategy: Strategy::NearestNeighbor,
            vehicle_capacity_kg: 100,
            seed: None,
            timeout_ms: 5_000,
        }
    }
}

impl RouteOptions {
    /// Parses options from the settings JSON; missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: RouteOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_stops == 0 {
            return Err(PlannerError::InvalidOptions("maxStops must be at least 1".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(PlannerError::InvalidOptions("timeoutMs must be positive".to_string()));
        }
        if self.vehicle_capacity_kg == 0 {
            return Err(PlannerError::InvalidOptions(
                "vehicleCapacityKg must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel::new(self.optimize_for)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
