//! Error type shared by the planner modules.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("an optimization run is already in progress")]
    OptimizationInProgress,

    #[error("invalid route options: {0}")]
    InvalidOptions(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("map link could not be built: {0}")]
    MapLink(String),

    #[error("formatting error")]
    Format(#[from] std::fmt::Error),

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
