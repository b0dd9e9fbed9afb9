//! Entity spawn factories for setting up the simulation world.
//!
//! Munitions are spawned with their full component bundle and a seeded
//! waypoint sequence, so the execution controller has something to fly
//! before the first planning batch returns.

use hecs::{Entity, World};

use salvo_core::components::{Assignment, ControllerState, Munition, PerformanceMetrics, Target};
use salvo_core::config::PlannerTuning;
use salvo_core::enums::{GuidanceMode, MunitionStatus, TargetStatus};
use salvo_core::planning::{Continuation, PlanningRequest};
use salvo_core::sequence::{Waypoint, WaypointSequence};
use salvo_core::types::KinematicState;

use crate::engagement::TargetLink;

/// Spawn a tracked target.
pub fn spawn_target(world: &mut World, state: KinematicState) -> Entity {
    world.spawn((Target {
        state,
        status: TargetStatus::Tracked,
    },))
}

/// Spawn a munition engaging `target`.
///
/// An unset reference bearing is fixed to the launch line of sight here, so
/// the archetype's approach angles never rotate with the munition.
pub fn spawn_munition(
    world: &mut World,
    state: KinematicState,
    target: Entity,
    mut assignment: Assignment,
    tuning: &PlannerTuning,
) -> Entity {
    let target_state = world.get::<&Target>(target).ok().map(|t| t.state);
    let mut waypoints = Vec::new();
    if let Some(target_state) = target_state {
        assignment.reference_bearing = Some(resolve_bearing(&assignment, &state, &target_state));
        waypoints = seed_waypoints(&state, &target_state, &assignment, tuning);
    }

    let controller = ControllerState {
        mode: waypoints
            .first()
            .map_or(GuidanceMode::Coast, |w| GuidanceMode::for_maneuver(w.kind)),
        ..ControllerState::default()
    };

    world.spawn((
        Munition {
            state,
            assignment,
            status: MunitionStatus::Active,
        },
        TargetLink {
            target: target_state.map(|_| target),
        },
        WaypointSequence::new(waypoints),
        controller,
        PerformanceMetrics::default(),
    ))
}

/// First plan for a munition, grown from its launch state.
///
/// The archetype's own plan when it validates, the straight-line
/// speed-matched tail otherwise.
pub fn seed_waypoints(
    state: &KinematicState,
    target: &KinematicState,
    assignment: &Assignment,
    tuning: &PlannerTuning,
) -> Vec<Waypoint> {
    let request = planning_request(state, target, assignment, Continuation::at(state), None);
    salvo_planner::plan(&request, tuning).tail
}

/// Pack one munition's planning request.
pub fn planning_request(
    munition: &KinematicState,
    target: &KinematicState,
    assignment: &Assignment,
    continuation: Continuation,
    impact_time: Option<f64>,
) -> PlanningRequest {
    PlanningRequest {
        munition: *munition,
        target: *target,
        archetype: assignment.archetype,
        slot: assignment.slot,
        reference_bearing: resolve_bearing(assignment, munition, target),
        continuation,
        impact_time,
    }
}

/// The assignment's reference bearing, or the current line of sight.
pub fn resolve_bearing(
    assignment: &Assignment,
    munition: &KinematicState,
    target: &KinematicState,
) -> f64 {
    assignment.reference_bearing.unwrap_or_else(|| {
        let los = target.position - munition.position;
        los.y.atan2(los.x)
    })
}
