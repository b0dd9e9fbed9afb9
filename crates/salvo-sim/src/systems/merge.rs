//! Merge planning results into live sequences.
//!
//! Each munition is re-validated before its result is written: it must still
//! exist, still be active, still have its target, and its sequence must be
//! exactly as collected (same generation, same current index). Anything else
//! drops the result. Writes only ever replace the unprotected tail.
//!
//! A tail is grown from the last protected waypoint at collection time, so
//! the seam is only valid while the protected boundary has not moved. A
//! munition that reached a waypoint while its plan was in flight waits for
//! the next cycle instead.

use hecs::{Entity, World};
use log::{debug, warn};

use salvo_core::components::{Guidable, Munition};
use salvo_core::events::SalvoEvent;
use salvo_core::planning::PlanningResult;
use salvo_core::sequence::WaypointSequence;

use crate::engagement::{entity_id, TargetLink};

/// A request as it was when dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatched {
    pub entity: Entity,
    pub generation: u64,
    pub current_index: usize,
}

/// Apply index-aligned results. Returns how many sequences changed.
pub fn apply(
    world: &mut World,
    dispatched: &[Dispatched],
    results: Vec<PlanningResult>,
    protected_count: usize,
    events: &mut Vec<SalvoEvent>,
) -> usize {
    if dispatched.len() != results.len() {
        warn!(
            "batch shape mismatch: {} requests, {} results; dropping batch",
            dispatched.len(),
            results.len()
        );
        return 0;
    }

    let mut merged = 0;
    for (sent, result) in dispatched.iter().zip(results) {
        let id = entity_id(sent.entity);
        if !still_valid(world, sent) {
            warn!("dropping plan for munition {id}: invalidated while in flight");
            events.push(SalvoEvent::ResultDropped { munition: id });
            continue;
        }

        if let Some(fault) = result.fault {
            warn!("munition {id} plan degraded to straight line: {fault}");
            events.push(SalvoEvent::PlanDegraded { munition: id, fault });
        }

        let Ok(mut sequence) = world.get::<&mut WaypointSequence>(sent.entity) else {
            continue;
        };
        if let Some(generation) = sequence.replace_tail(protected_count, &result.tail) {
            debug!(
                "munition {id} merged {} waypoints, generation {generation}",
                result.tail.len()
            );
            events.push(SalvoEvent::WaypointsUpdated {
                munition: id,
                generation,
                tail_len: result.tail.len(),
            });
            merged += 1;
        }
    }
    merged
}

fn still_valid(world: &World, sent: &Dispatched) -> bool {
    let active = world
        .get::<&Munition>(sent.entity)
        .is_ok_and(|m| m.is_active());
    let current = world
        .get::<&WaypointSequence>(sent.entity)
        .is_ok_and(|s| {
            s.generation() == sent.generation && s.current_index() == sent.current_index
        });
    let targeted = world
        .get::<&TargetLink>(sent.entity)
        .is_ok_and(|link| link.resolve(world).is_some());
    active && current && targeted
}
