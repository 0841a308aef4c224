//! Test fixtures for route-planner.
//!
//! Provides realistic test data:
//! - Real Las Vegas / Henderson delivery points (from OpenStreetMap)
//! - Builders that turn them into stops

pub mod las_vegas_locations;

#[allow(unused_imports)]
pub use las_vegas_locations::*;
