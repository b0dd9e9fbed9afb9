//! Snapshot system: queries the ECS world and builds a complete SalvoSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use salvo_core::components::{ControllerState, Munition, PerformanceMetrics, Target};
use salvo_core::events::SalvoEvent;
use salvo_core::sequence::WaypointSequence;
use salvo_core::state::{MunitionView, PlanningView, SalvoSnapshot, TargetView};
use salvo_core::types::SimTime;

use crate::engagement::{entity_id, TargetLink};

/// Build a complete SalvoSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    planning: PlanningView,
    events: Vec<SalvoEvent>,
) -> SalvoSnapshot {
    SalvoSnapshot {
        time: *time,
        planning,
        munitions: build_munitions(world),
        targets: build_targets(world),
        events,
    }
}

fn build_munitions(world: &World) -> Vec<MunitionView> {
    let mut views: Vec<MunitionView> = world
        .query::<(
            &Munition,
            &TargetLink,
            &WaypointSequence,
            &ControllerState,
            &PerformanceMetrics,
        )>()
        .iter()
        .map(|(entity, (munition, link, sequence, controller, metrics))| MunitionView {
            id: entity_id(entity),
            target: link.target.map(entity_id),
            state: munition.state,
            assignment: munition.assignment,
            mode: controller.mode,
            current_index: sequence.current_index(),
            generation: sequence.generation(),
            waypoints: sequence.waypoints().to_vec(),
            command: controller.last_command,
            metrics: *metrics,
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}

fn build_targets(world: &World) -> Vec<TargetView> {
    let mut views: Vec<TargetView> = world
        .query::<&Target>()
        .iter()
        .map(|(entity, target)| TargetView {
            id: entity_id(entity),
            state: target.state,
        })
        .collect();

    views.sort_by_key(|v| v.id);
    views
}
