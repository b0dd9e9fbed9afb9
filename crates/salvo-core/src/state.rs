//! Snapshot of the core's visible state, produced after every tick.

use serde::{Deserialize, Serialize};

use crate::components::{Assignment, PerformanceMetrics};
use crate::enums::GuidanceMode;
use crate::events::SalvoEvent;
use crate::sequence::Waypoint;
use crate::types::{GuidanceCommand, KinematicState, SimTime};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalvoSnapshot {
    pub time: SimTime,
    pub planning: PlanningView,
    pub munitions: Vec<MunitionView>,
    pub targets: Vec<TargetView>,
    pub events: Vec<SalvoEvent>,
}

/// Scheduler status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningView {
    /// Current planning period (seconds).
    pub period_secs: f64,
    /// Smallest time-to-impact seen at the last scheduling tick (seconds).
    pub min_time_to_impact: Option<f64>,
    pub batches_dispatched: u64,
    pub last_batch_size: usize,
    pub in_flight: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MunitionView {
    pub id: u64,
    pub target: Option<u64>,
    pub state: KinematicState,
    pub assignment: Assignment,
    pub mode: GuidanceMode,
    pub current_index: usize,
    pub generation: u64,
    pub waypoints: Vec<Waypoint>,
    pub command: GuidanceCommand,
    pub metrics: PerformanceMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetView {
    pub id: u64,
    pub state: KinematicState,
}
