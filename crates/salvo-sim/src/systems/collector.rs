//! State collector: a validated copy of every plannable munition.
//!
//! Zero-trust: a munition only reaches the planner if it still exists, is
//! active, has a live target, and every kinematic value on both sides is
//! finite and within sane bounds. Rejections are per munition and never
//! abort the batch.

use hecs::{Entity, World};
use log::{debug, warn};

use salvo_core::components::{Assignment, Guidable, Munition};
use salvo_core::config::ValidationLimits;
use salvo_core::enums::RejectReason;
use salvo_core::events::SalvoEvent;
use salvo_core::sequence::WaypointSequence;
use salvo_core::types::KinematicState;

use crate::engagement::{entity_id, TargetLink};

/// One munition's validated snapshot, copied out of the world.
#[derive(Debug, Clone)]
pub struct Collected {
    pub entity: Entity,
    pub munition: KinematicState,
    pub target: KinematicState,
    pub assignment: Assignment,
    /// Generation of the sequence at collection time.
    pub generation: u64,
    /// Waypoint being pursued at collection time.
    pub current_index: usize,
}

/// Gather every munition that may be planned this cycle.
pub fn collect(
    world: &World,
    limits: &ValidationLimits,
    events: &mut Vec<SalvoEvent>,
) -> Vec<Collected> {
    let mut batch = Vec::new();
    for (entity, (munition, link, sequence)) in world
        .query::<(&Munition, &TargetLink, &WaypointSequence)>()
        .iter()
    {
        match check(world, munition, link, limits) {
            Ok(target) => batch.push(Collected {
                entity,
                munition: munition.kinematics(),
                target,
                assignment: munition.assignment(),
                generation: sequence.generation(),
                current_index: sequence.current_index(),
            }),
            Err(reason) => {
                let id = entity_id(entity);
                match reason {
                    // Expected steady state: destroyed, or coasting without a target.
                    RejectReason::NotActive | RejectReason::NoTarget => {
                        debug!("munition {id} not planned: {reason:?}")
                    }
                    _ => warn!("munition {id} rejected by collector: {reason:?}"),
                }
                events.push(SalvoEvent::MunitionRejected {
                    munition: id,
                    reason,
                });
            }
        }
    }
    batch
}

fn check(
    world: &World,
    munition: &Munition,
    link: &TargetLink,
    limits: &ValidationLimits,
) -> Result<KinematicState, RejectReason> {
    if !munition.is_active() {
        return Err(RejectReason::NotActive);
    }
    check_state(&munition.kinematics(), limits)?;
    let target = link.resolve(world).ok_or(RejectReason::NoTarget)?;
    check_state(&target, limits)?;
    Ok(target)
}

/// Reject non-finite values and absurd magnitudes.
pub fn check_state(state: &KinematicState, limits: &ValidationLimits) -> Result<(), RejectReason> {
    if !state.is_finite() {
        return Err(RejectReason::NonFinite);
    }
    let in_range = state.speed() <= limits.max_speed
        && state.position.length() <= limits.max_position
        && (0.0..=limits.max_acceleration).contains(&state.max_acceleration)
        && (0.0..=limits.max_rotation_rate).contains(&state.max_rotation_rate);
    if in_range {
        Ok(())
    } else {
        Err(RejectReason::OutOfRange)
    }
}
