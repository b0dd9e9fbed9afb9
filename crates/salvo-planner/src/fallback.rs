//! Straight-line tail used when a plan fails validation, and to seed new
//! sequences.

use salvo_core::config::PlannerTuning;
use salvo_core::enums::ManeuverKind;
use salvo_core::planning::PlanningRequest;
use salvo_core::sequence::Waypoint;
use salvo_core::types::KinematicState;

use crate::intercept::lead_point;

/// Fly straight from the continuation point at the continuation speed toward
/// where the target will be.
pub fn straight_line(req: &PlanningRequest, tuning: &PlannerTuning) -> Vec<Waypoint> {
    let arch = tuning.archetype(req.archetype.kind());
    let start = &req.continuation;
    let target = KinematicState {
        position: req.target.extrapolate(start.lead_time),
        ..req.target
    };
    let (aim, _) = lead_point(&target, start.position, start.speed);

    let mut tail = Vec::with_capacity(2);
    if start.position.distance(aim) >= 2.0 * tuning.min_spacing {
        tail.push(
            Waypoint::new(start.position.lerp(aim, 0.5), start.speed, ManeuverKind::Cruise)
                .with_tolerances(arch.acceptance_radius, arch.speed_tolerance),
        );
    }
    tail.push(
        Waypoint::new(aim, start.speed, ManeuverKind::Terminal)
            .with_tolerances(arch.acceptance_radius, arch.speed_tolerance),
    );
    tail
}
