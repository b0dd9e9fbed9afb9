//! Offset-angle: build leg, then an arc onto the assigned approach direction.
//!
//! Cooperating munitions spread their approach directions by the archetype's
//! separation angle, one step per slot.

use salvo_core::error::PlanFault;
use salvo_core::planning::Continuation;

use super::{curved_intercept, Body, Context};
use crate::maneuver::turn_radius;

pub fn body(ctx: &Context, origin: &Continuation) -> Result<Body, PlanFault> {
    let approach = ctx
        .approach_direction()
        .ok_or(PlanFault::DegenerateGeometry)?;
    let profile = ctx.full_speed_profile(origin);
    let radius = turn_radius(profile.v_cruise, ctx.lateral_accel());

    curved_intercept(ctx, origin, profile, approach, radius)
}
