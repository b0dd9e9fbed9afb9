//! Time-to-impact estimation and intercept-point solving.

use salvo_core::types::{KinematicState, Vec2};

use crate::profile::SpeedProfile;

/// Where and when a profile meets the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intercept {
    pub point: Vec2,
    /// Seconds after the path origin is reached.
    pub time: f64,
}

/// Estimate time-to-impact from the closing speed along the line of sight.
///
/// Infinite when the two are not closing.
pub fn time_to_impact(munition: &KinematicState, target: &KinematicState) -> f64 {
    let los = target.position - munition.position;
    let range = los.length();
    if range < 1.0 {
        return 0.0;
    }
    let closing = (munition.velocity - target.velocity).dot(los / range);
    if closing > 1e-6 {
        range / closing
    } else {
        f64::INFINITY
    }
}

/// Solve for the first time a munition following `profile` from `from` meets
/// the target.
///
/// The path origin is reached `lead_time` seconds from now; the target is
/// extrapolated to `lead_time + t`. `detour` is extra path length on top of
/// the straight line (curved archetypes). Searches `[0, horizon]`.
pub fn solve_intercept(
    from: Vec2,
    lead_time: f64,
    profile: &SpeedProfile,
    target: &KinematicState,
    detour: f64,
    horizon: f64,
) -> Option<Intercept> {
    let gap = |t: f64| {
        profile.distance_at(t) - (target.extrapolate(lead_time + t).distance(from) + detour)
    };

    if gap(0.0) >= 0.0 {
        return Some(Intercept {
            point: target.extrapolate(lead_time),
            time: 0.0,
        });
    }

    // Coarse scan for the first sign change, then bisect inside it.
    let steps = 2_000;
    let dt = horizon / steps as f64;
    let mut lo = 0.0;
    let mut hi = None;
    for i in 1..=steps {
        let t = dt * i as f64;
        if gap(t) >= 0.0 {
            hi = Some(t);
            break;
        }
        lo = t;
    }
    let mut hi = hi?;

    for _ in 0..60 {
        let mid = 0.5 * (lo + hi);
        if gap(mid) >= 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    Some(Intercept {
        point: target.extrapolate(lead_time + hi),
        time: hi,
    })
}

/// Lead point for a constant-speed straight flight, refined twice.
///
/// Returns (point, seconds of flight).
pub fn lead_point(target: &KinematicState, from: Vec2, speed: f64) -> (Vec2, f64) {
    let speed = speed.max(1.0);
    let mut tti = from.distance(target.position) / speed;
    for _ in 0..2 {
        tti = from.distance(target.extrapolate(tti)) / speed;
    }
    (target.extrapolate(tti), tti)
}
