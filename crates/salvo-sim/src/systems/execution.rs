//! Execution controller: flies every munition along its sequence, every tick.
//!
//! Independent of planning cadence. The controller re-reads the current
//! index and generation each tick and keeps nothing from the previous tick
//! except the flip goal (tied to an index) and the last command. It writes
//! only the current index; waypoint contents belong to the merge step.

use std::collections::HashSet;

use hecs::{Entity, World};

use salvo_core::components::{ControllerState, Guidable, Munition, PerformanceMetrics, Target};
use salvo_core::config::GuidanceTuning;
use salvo_core::enums::{AcceptReason, GuidanceMode, ManeuverKind};
use salvo_core::events::SalvoEvent;
use salvo_core::sequence::WaypointSequence;
use salvo_core::types::{GuidanceCommand, KinematicState};

use crate::engagement::{entity_id, TargetLink};
use crate::guidance;

/// Run one guidance step for every munition.
pub fn run(world: &mut World, tuning: &GuidanceTuning, dt: f64, events: &mut Vec<SalvoEvent>) {
    let tracked: HashSet<Entity> = world
        .query::<&Target>()
        .iter()
        .filter(|(_, t)| t.is_tracked())
        .map(|(entity, _)| entity)
        .collect();

    for (entity, (munition, link, sequence, controller, metrics)) in world.query_mut::<(
        &Munition,
        &TargetLink,
        &mut WaypointSequence,
        &mut ControllerState,
        &mut PerformanceMetrics,
    )>() {
        let previous = controller.last_command;
        let command = if !munition.is_active() || !munition.state.is_finite() {
            controller.mode = GuidanceMode::Coast;
            GuidanceCommand::COAST
        } else if !link.target.is_some_and(|t| tracked.contains(&t)) {
            if !controller.target_lost {
                controller.target_lost = true;
                events.push(SalvoEvent::TargetLost {
                    munition: entity_id(entity),
                });
            }
            controller.mode = GuidanceMode::Coast;
            GuidanceCommand::COAST
        } else {
            controller.target_lost = false;
            step(entity, &munition.kinematics(), sequence, controller, metrics, tuning, dt, events)
        };

        controller.last_command = command;
        let change = (command.rotation_rate - previous.rotation_rate).abs();
        metrics.smoothness += tuning.metrics_smoothing * (change - metrics.smoothness);
        metrics.ticks += 1;
    }
}

/// Accept, advance and steer one munition with a live target.
#[allow(clippy::too_many_arguments)]
fn step(
    entity: Entity,
    state: &KinematicState,
    sequence: &mut WaypointSequence,
    controller: &mut ControllerState,
    metrics: &mut PerformanceMetrics,
    tuning: &GuidanceTuning,
    dt: f64,
    events: &mut Vec<SalvoEvent>,
) -> GuidanceCommand {
    if controller.seen_generation != sequence.generation() {
        controller.seen_generation = sequence.generation();
        // The sequence changed under us; only keep a flip still being flown.
        let flipping = sequence.current().is_some_and(|w| w.kind == ManeuverKind::Flip);
        if !flipping {
            controller.flip = None;
        }
    }

    if let Some(reason) = acceptance(state, sequence, controller, tuning) {
        events.push(SalvoEvent::WaypointReached {
            munition: entity_id(entity),
            index: sequence.current_index(),
            reason,
        });
        sequence.advance();
        controller.flip = None;
        metrics.waypoints_reached += 1;
    }

    let index = sequence.current_index();
    let Some(waypoint) = sequence.current().copied() else {
        controller.mode = GuidanceMode::Coast;
        return GuidanceCommand::COAST;
    };
    let next = sequence.next().copied();

    metrics.position_error = state.position.distance(waypoint.position);
    metrics.speed_error = (waypoint.target_speed - state.speed()).abs();

    controller.mode = GuidanceMode::for_maneuver(waypoint.kind);
    match controller.mode {
        GuidanceMode::Flip => {
            let goal = flip_goal(state, index, controller);
            guidance::flip(state, goal, dt)
        }
        GuidanceMode::Burn => guidance::burn(state, &waypoint, dt, tuning),
        GuidanceMode::Terminal => guidance::pursue(
            state,
            &waypoint,
            next.as_ref(),
            tuning.terminal_navigation_constant,
            dt,
            tuning,
        ),
        GuidanceMode::CruiseToWaypoint | GuidanceMode::Coast => guidance::pursue(
            state,
            &waypoint,
            next.as_ref(),
            tuning.navigation_constant,
            dt,
            tuning,
        ),
    }
}

/// Whether the current waypoint is done, and why.
fn acceptance(
    state: &KinematicState,
    sequence: &WaypointSequence,
    controller: &mut ControllerState,
    tuning: &GuidanceTuning,
) -> Option<AcceptReason> {
    let waypoint = sequence.current()?;
    if waypoint.kind == ManeuverKind::Flip {
        let goal = flip_goal(state, sequence.current_index(), controller);
        return guidance::flip_complete(state, goal, tuning).then_some(AcceptReason::FlipComplete);
    }
    guidance::accept(state, waypoint, tuning)
}

/// The flip goal for `index`, fixed when the flip starts.
fn flip_goal(state: &KinematicState, index: usize, controller: &mut ControllerState) -> f64 {
    match controller.flip {
        Some((flipping, goal)) if flipping == index => goal,
        _ => {
            let goal = guidance::flip_goal(state);
            controller.flip = Some((index, goal));
            goal
        }
    }
}
