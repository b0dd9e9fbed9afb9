//! Coordinated-simultaneous: fan out to a slot's approach direction, then
//! converge on an impact time shared by the whole group.
//!
//! The shape is the offset-angle one with the approach spread across the fan
//! arc. Timing comes from the cruise speed: it is solved so the path takes
//! exactly the time left until the group's impact time.

use salvo_core::error::PlanFault;
use salvo_core::planning::Continuation;

use super::{approach_path, curved_intercept, Body, Context};
use crate::maneuver::turn_radius;
use crate::profile::SpeedProfile;

pub fn body(ctx: &Context, origin: &Continuation) -> Result<Body, PlanFault> {
    let approach = ctx
        .approach_direction()
        .ok_or(PlanFault::DegenerateGeometry)?;
    let top = ctx.full_speed_profile(origin);
    // Sized for the top speed so the arc stays put while the cruise speed is re-solved.
    let radius = turn_radius(top.v_cruise, ctx.lateral_accel());

    let available = ctx
        .req
        .impact_time
        .map(|t| t - origin.lead_time)
        .filter(|t| *t > 0.0);

    let Some(available) = available else {
        return curved_intercept(ctx, origin, top, approach, radius);
    };

    let aim = ctx.req.target.extrapolate(origin.lead_time + available);
    let path = approach_path(ctx, origin, aim, approach, radius)?;
    let length = path.length();
    let v_cruise = cruise_speed_for(origin.speed, ctx.boost_accel(), top.v_cruise, length, available);
    let profile = SpeedProfile::new(origin.speed, ctx.boost_accel(), v_cruise);
    let arrival = profile.time_at_distance(length);

    Ok(Body {
        origin: origin.position,
        path,
        profile,
        arrival,
    })
}

/// Cruise speed in `[v0, v_top]` that covers `length` in `available` seconds.
///
/// Clamps to the nearest bound when no speed in range makes it exactly; the
/// profile never plans a slow-down below `v0`.
pub fn cruise_speed_for(v0: f64, accel: f64, v_top: f64, length: f64, available: f64) -> f64 {
    let time = |v: f64| SpeedProfile::new(v0, accel, v).time_at_distance(length);
    let mut lo = v0.max(1.0).min(v_top);
    let mut hi = v_top;
    if time(hi) >= available {
        return hi;
    }
    if time(lo) <= available {
        return lo;
    }
    for _ in 0..60 {
        let mid = 0.5 * (lo + hi);
        if time(mid) > available {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}
