//! Planning batch layout: one request in, one result out, index-aligned.

use serde::{Deserialize, Serialize};

use crate::enums::TrajectoryArchetype;
use crate::error::PlanFault;
use crate::sequence::Waypoint;
use crate::types::{KinematicState, Vec2};

/// Where a new trajectory segment is grown from.
///
/// Derived from the munition's own physical state or from waypoints it is
/// already committed to, never from the replaceable part of the planner's
/// previous output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Continuation {
    /// Position (meters).
    pub position: Vec2,
    /// Unit direction of travel at the continuation point.
    pub direction: Vec2,
    /// Speed at the continuation point (m/s).
    pub speed: f64,
    /// Seconds until the munition is expected to be there.
    pub lead_time: f64,
}

impl Continuation {
    /// Continuation at the munition's current state, with no look-ahead.
    pub fn at(state: &KinematicState) -> Self {
        Self {
            position: state.position,
            direction: state.travel_direction(),
            speed: state.speed(),
            lead_time: 0.0,
        }
    }
}

/// Cooperative slot within a launch group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub index: u32,
    pub count: u32,
}

impl Slot {
    pub fn single() -> Self {
        Self { index: 0, count: 1 }
    }

    /// Offset of this slot from the group centre, in slot units.
    /// For 3 slots: -1, 0, 1. For 2 slots: -0.5, 0.5.
    pub fn centred_offset(&self) -> f64 {
        let count = self.count.max(1) as f64;
        self.index.min(self.count.saturating_sub(1)) as f64 - (count - 1.0) / 2.0
    }
}

/// One munition's entry in a planning batch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub munition: KinematicState,
    pub target: KinematicState,
    pub archetype: TrajectoryArchetype,
    pub slot: Slot,
    /// World bearing (radians) the archetype's angles are measured from.
    pub reference_bearing: f64,
    pub continuation: Continuation,
    /// Seconds from now at which a coordinated group should impact.
    pub impact_time: Option<f64>,
}

/// One munition's planning outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningResult {
    /// Replacement for the unprotected part of the sequence.
    pub tail: Vec<Waypoint>,
    /// False when validation failed and `tail` is the straight-line fallback.
    pub feasible: bool,
    /// Why the plan was degraded, when it was.
    pub fault: Option<PlanFault>,
}

impl PlanningResult {
    pub fn feasible(tail: Vec<Waypoint>) -> Self {
        Self {
            tail,
            feasible: true,
            fault: None,
        }
    }

    pub fn degraded(tail: Vec<Waypoint>, fault: PlanFault) -> Self {
        Self {
            tail,
            feasible: false,
            fault: Some(fault),
        }
    }
}
