//! Waypoints and the live waypoint sequence shared by planning and execution.
//!
//! Ownership of a `WaypointSequence` is split by field: the scheduler's merge
//! step is the only writer of the waypoint list (through [`WaypointSequence::replace_tail`]),
//! the execution controller is the only writer of the current index (through
//! [`WaypointSequence::advance`]). The list itself is an immutable shared slice that is
//! swapped as a whole, so a reader never sees a half-updated plan.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::enums::ManeuverKind;
use crate::types::Vec2;

/// A planned point the munition steers toward, with a speed to match on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Position (meters).
    pub position: Vec2,
    /// Speed to hold when passing this waypoint (m/s).
    pub target_speed: f64,
    /// Half-width of the acceptable speed band (m/s).
    pub speed_tolerance: f64,
    /// Distance at which the waypoint counts as reached (meters).
    pub acceptance_radius: f64,
    pub kind: ManeuverKind,
    /// Optional upper bound on thrust fraction while pursuing this waypoint.
    pub thrust_cap: Option<f64>,
}

impl Waypoint {
    pub fn new(position: Vec2, target_speed: f64, kind: ManeuverKind) -> Self {
        Self {
            position,
            target_speed,
            speed_tolerance: 0.0,
            acceptance_radius: 0.0,
            kind,
            thrust_cap: None,
        }
    }

    /// Attach the archetype's acceptance radius and speed band.
    pub fn with_tolerances(mut self, acceptance_radius: f64, speed_tolerance: f64) -> Self {
        self.acceptance_radius = acceptance_radius;
        self.speed_tolerance = speed_tolerance;
        self
    }

    pub fn with_thrust_cap(mut self, cap: f64) -> Self {
        self.thrust_cap = Some(cap.clamp(0.0, 1.0));
        self
    }

    /// Bit-for-bit equality, used to check the protection invariant.
    pub fn bitwise_eq(&self, other: &Waypoint) -> bool {
        self.position.x.to_bits() == other.position.x.to_bits()
            && self.position.y.to_bits() == other.position.y.to_bits()
            && self.target_speed.to_bits() == other.target_speed.to_bits()
            && self.speed_tolerance.to_bits() == other.speed_tolerance.to_bits()
            && self.acceptance_radius.to_bits() == other.acceptance_radius.to_bits()
            && self.kind == other.kind
            && self.thrust_cap.map(f64::to_bits) == other.thrust_cap.map(f64::to_bits)
    }
}

/// The ordered plan a munition is flying, plus its progress and version.
#[derive(Debug, Clone)]
pub struct WaypointSequence {
    waypoints: Arc<[Waypoint]>,
    current_index: usize,
    generation: u64,
}

impl WaypointSequence {
    /// A freshly seeded sequence at generation 0.
    pub fn new(waypoints: Vec<Waypoint>) -> Self {
        Self {
            waypoints: waypoints.into(),
            current_index: 0,
            generation: 0,
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Shared handle to the current list, for telemetry readers.
    pub fn shared(&self) -> Arc<[Waypoint]> {
        Arc::clone(&self.waypoints)
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The waypoint being pursued, if the sequence is not exhausted.
    pub fn current(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.current_index)
    }

    /// The waypoint after the current one.
    pub fn next(&self) -> Option<&Waypoint> {
        self.waypoints.get(self.current_index + 1)
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.waypoints.len()
    }

    /// First index a merge is allowed to replace.
    ///
    /// Indices below `current_index + protected_count` are protected; if the
    /// sequence is shorter than that, everything it has is protected.
    pub fn protected_end(&self, protected_count: usize) -> usize {
        (self.current_index + protected_count).min(self.waypoints.len())
    }

    /// The protected waypoints from the current index onward.
    pub fn protected_ahead(&self, protected_count: usize) -> &[Waypoint] {
        let start = self.current_index.min(self.waypoints.len());
        &self.waypoints[start..self.protected_end(protected_count)]
    }

    /// Replace everything from the protected boundary onward with `tail`.
    ///
    /// Builds a new list and swaps it in whole. Protected waypoints are copied
    /// unchanged, `current_index` is untouched and the generation is bumped.
    /// An empty tail is a no-op and returns `None`.
    pub fn replace_tail(&mut self, protected_count: usize, tail: &[Waypoint]) -> Option<u64> {
        if tail.is_empty() {
            return None;
        }
        let keep = self.protected_end(protected_count);
        let mut merged = Vec::with_capacity(keep + tail.len());
        merged.extend_from_slice(&self.waypoints[..keep]);
        merged.extend_from_slice(tail);
        self.waypoints = merged.into();
        self.generation += 1;
        Some(self.generation)
    }

    /// Move on to the next waypoint. Returns false if already exhausted.
    pub fn advance(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.current_index += 1;
        true
    }

    /// Start over with a new plan (retargeting). The generation keeps increasing.
    pub fn reseed(&mut self, waypoints: Vec<Waypoint>) -> u64 {
        self.waypoints = waypoints.into();
        self.current_index = 0;
        self.generation += 1;
        self.generation
    }
}
