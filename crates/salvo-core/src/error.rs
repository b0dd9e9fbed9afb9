//! Error types.
//!
//! Only configuration and backend start-up failures are errors in the
//! propagating sense. Per-munition problems (`PlanFault`) are values carried
//! in results and events; they never abort a batch.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error returned when constructing the core.
#[derive(Debug, Error)]
pub enum SalvoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Failure loading or validating tuning.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// The parallel compute backend could not be brought up.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("planning backend unavailable: {0}")]
    Unavailable(String),
}

/// Why a planned tail failed physical feasibility validation.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlanFault {
    #[error("planner produced an empty tail")]
    EmptyTail,
    #[error("waypoint {index} has a non-finite value")]
    NonFinite { index: usize },
    #[error("waypoint {index} is {spacing:.1} m from its predecessor")]
    SpacingTooSmall { index: usize, spacing: f64 },
    #[error("waypoint {index} needs a speed change of {delta_v:.1} m/s but only {available:.1} m/s is reachable")]
    VelocityChangeInfeasible {
        index: usize,
        delta_v: f64,
        available: f64,
    },
    #[error("waypoint {index} turns with radius {radius:.0} m in {available:.0} m")]
    TurnRadiusExceeded {
        index: usize,
        radius: f64,
        available: f64,
    },
    #[error("no intercept within the planning horizon")]
    NoIntercept,
    #[error("archetype geometry is degenerate")]
    DegenerateGeometry,
}
