//! Direct: straight to the lead intercept point on a monotonic speed profile.

use salvo_core::enums::ManeuverKind;
use salvo_core::error::PlanFault;
use salvo_core::planning::Continuation;

use super::{Body, Context};
use crate::geometry::PathBuilder;
use crate::intercept::solve_intercept;

pub fn body(ctx: &Context, origin: &Continuation) -> Result<Body, PlanFault> {
    let profile = ctx.full_speed_profile(origin);
    let hit = solve_intercept(
        origin.position,
        origin.lead_time,
        &profile,
        &ctx.req.target,
        0.0,
        ctx.tuning.intercept_horizon_secs,
    )
    .ok_or(PlanFault::NoIntercept)?;

    let mut path = PathBuilder::new(origin.position, ctx.tuning.min_spacing);
    path.line_to(
        hit.point,
        ctx.arch.segment_length,
        ctx.tuning.max_waypoints,
        ManeuverKind::Cruise,
    );

    Ok(Body {
        origin: origin.position,
        path,
        profile,
        arrival: hit.time,
    })
}
