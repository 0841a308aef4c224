//! route-planner core
//!
//! Orders delivery stops into a short route, keeps a working route session
//! with saved snapshots, and renders the result as GPX, KML, CSV, JSON or a
//! map deep link.

pub mod analytics;
pub mod cost;
pub mod destination;
pub mod error;
pub mod export;
pub mod haversine;
pub mod maps;
pub mod options;
pub mod session;
pub mod solver;
pub mod stop;
pub mod traits;

pub use error::{PlannerError, Result};
pub use session::{OptimizationOutcome, RouteSession};
pub use solver::Strategy;
pub use stop::{Stop, StopId};
