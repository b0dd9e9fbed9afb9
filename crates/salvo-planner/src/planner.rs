//! Per-request planning: flip decision, archetype geometry, validation and
//! fallback.

use salvo_core::config::PlannerTuning;
use salvo_core::error::PlanFault;
use salvo_core::planning::{Continuation, PlanningRequest, PlanningResult};
use salvo_core::sequence::Waypoint;

use crate::archetype::{self, Context};
use crate::fallback;
use crate::maneuver;
use crate::validate::validate_tail;

/// A built (not yet validated) tail and when it reaches its last waypoint.
struct Plan {
    waypoints: Vec<Waypoint>,
    /// Seconds from now.
    arrival: f64,
}

/// Plan one munition. Never fails: an infeasible plan degrades to the
/// straight-line fallback with the fault attached.
pub fn plan(req: &PlanningRequest, tuning: &PlannerTuning) -> PlanningResult {
    let checked = build(req, tuning).and_then(|plan| {
        validate_tail(
            &req.continuation,
            &plan.waypoints,
            req.munition.max_acceleration,
            tuning,
        )?;
        Ok(plan.waypoints)
    });
    match checked {
        Ok(tail) => PlanningResult::feasible(tail),
        Err(fault) => PlanningResult::degraded(fallback::straight_line(req, tuning), fault),
    }
}

/// Seconds from now until the munition could reach its target at full speed
/// along its archetype's shape. Used to agree on a group impact time.
pub fn earliest_arrival(req: &PlanningRequest, tuning: &PlannerTuning) -> Option<f64> {
    let unconstrained = PlanningRequest {
        impact_time: None,
        ..*req
    };
    build(&unconstrained, tuning)
        .ok()
        .map(|plan| plan.arrival)
        .filter(|t| t.is_finite())
}

fn build(req: &PlanningRequest, tuning: &PlannerTuning) -> Result<Plan, PlanFault> {
    let munition = &req.munition;
    if !(munition.max_acceleration > 0.0 && munition.max_rotation_rate > 0.0) {
        return Err(PlanFault::DegenerateGeometry);
    }
    let ctx = Context::new(req, tuning);
    let origin = req.continuation;
    let (turn, distance) = archetype::required_turn(&ctx, &origin);
    let turn_speed = maneuver::turn_speed(distance, ctx.lateral_accel(), tuning);

    if !maneuver::needs_flip(&origin, turn, distance, ctx.lateral_accel(), tuning) {
        match archetype::body(&ctx, &origin) {
            Ok(body) => {
                return Ok(Plan {
                    waypoints: archetype::finish(&body, ctx.arch),
                    arrival: origin.lead_time + body.arrival,
                })
            }
            // Too fast for the archetype's curve: slow down first.
            Err(PlanFault::TurnRadiusExceeded { .. }) if origin.speed > turn_speed => {}
            Err(fault) => return Err(fault),
        }
    } else if origin.speed <= ctx.arch.max_speed {
        // No faster than the archetype plans anyway: a flip would not tighten
        // the arc, so a path that already flies as-is is kept.
        if let Some(plan) = without_flip(&ctx, &origin) {
            return Ok(plan);
        }
    }

    let mut prefix = maneuver::flip_and_burn(
        &origin,
        distance,
        munition.max_acceleration,
        munition.max_rotation_rate,
        ctx.arch,
        tuning,
    );
    let mut body = archetype::body(&ctx, &prefix.origin)?;
    if let Some(first_leg) = body.first_leg() {
        if maneuver::second_flip(
            &mut prefix,
            first_leg,
            munition.max_rotation_rate,
            ctx.arch,
            tuning,
        ) {
            body = archetype::body(&ctx, &prefix.origin)?;
        }
    }

    let arrival = prefix.origin.lead_time + body.arrival;
    let mut waypoints = prefix.waypoints;
    waypoints.extend(archetype::finish(&body, ctx.arch));
    Ok(Plan { waypoints, arrival })
}

/// The archetype's own path from `origin`, if it validates without a prefix.
fn without_flip(ctx: &Context, origin: &Continuation) -> Option<Plan> {
    let body = archetype::body(ctx, origin).ok()?;
    let waypoints = archetype::finish(&body, ctx.arch);
    validate_tail(
        origin,
        &waypoints,
        ctx.req.munition.max_acceleration,
        ctx.tuning,
    )
    .ok()?;
    Some(Plan {
        waypoints,
        arrival: origin.lead_time + body.arrival,
    })
}
