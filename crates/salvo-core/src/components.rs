//! ECS components for hecs entities.
//!
//! Components are plain data. Guidance logic lives in systems, not components.
//! The one exception is [`Guidable`], the capability that marks a type as
//! something the scheduler may plan for.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::planning::Slot;
use crate::types::KinematicState;

/// Launch-time assignment written by the launch collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub archetype: TrajectoryArchetype,
    /// Coordination group shared by cooperating munitions, if any.
    pub group: Option<u32>,
    pub slot: Slot,
    /// World bearing (radians) that archetype angles are measured from.
    /// Resolved to the launch line of sight when the munition is spawned.
    pub reference_bearing: Option<f64>,
}

impl Assignment {
    pub fn direct() -> Self {
        Self {
            archetype: TrajectoryArchetype::Direct,
            group: None,
            slot: Slot::single(),
            reference_bearing: None,
        }
    }
}

/// A guided projectile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Munition {
    pub state: KinematicState,
    pub assignment: Assignment,
    pub status: MunitionStatus,
}

/// A kinematic point the munitions are steered at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub state: KinematicState,
    pub status: TargetStatus,
}

impl Target {
    pub fn is_tracked(&self) -> bool {
        self.status == TargetStatus::Tracked
    }
}

/// Execution controller memory, owned by the controller alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerState {
    pub mode: GuidanceMode,
    /// Sequence generation observed on the previous tick.
    pub seen_generation: u64,
    /// Heading a flip in progress is rotating to, and the index it belongs to.
    pub flip: Option<(usize, f64)>,
    /// Command issued on the previous tick.
    pub last_command: crate::types::GuidanceCommand,
    /// Set while coasting because the target is gone.
    pub target_lost: bool,
}

/// Per-munition guidance quality, for tuning and telemetry collaborators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Distance to the current waypoint (meters).
    pub position_error: f64,
    /// |target speed - speed| at the current waypoint (m/s).
    pub speed_error: f64,
    /// Moving average of the per-tick change in rotation command (rad/s).
    /// Lower is smoother.
    pub smoothness: f64,
    /// Ticks flown under guidance.
    pub ticks: u64,
    /// Waypoints accepted so far.
    pub waypoints_reached: u32,
}

/// Capability: something the planner can produce waypoints for.
pub trait Guidable {
    fn kinematics(&self) -> KinematicState;
    fn assignment(&self) -> Assignment;
    fn is_active(&self) -> bool;
}

impl Guidable for Munition {
    fn kinematics(&self) -> KinematicState {
        self.state
    }

    fn assignment(&self) -> Assignment {
        self.assignment
    }

    fn is_active(&self) -> bool {
        self.status == MunitionStatus::Active
    }
}
