//! Continuation points: where a replanned tail is grown from.
//!
//! With protected waypoints ahead, the point is the last of them. The
//! munition is committed to flying through it and no merge can move it, so
//! the tail a merge appends starts exactly where the kept prefix ends. Speed
//! and direction at that point come from the protected legs themselves, which
//! carries any planned burn through to the next plan. The replaceable tail of
//! the previous plan never contributes.
//!
//! With nothing protected ahead, the point is extrapolated from the live
//! state along the velocity.

use salvo_core::config::SchedulerTuning;
use salvo_core::planning::Continuation;
use salvo_core::sequence::Waypoint;
use salvo_core::types::{KinematicState, Vec2};

/// Continuation for one munition.
///
/// * protected waypoints ahead: position and speed of the last one, the
///   direction of the leg into it, and the time to fly the protected legs
///   from the live position at their mean speeds;
/// * none: the live state moved on by `continuation_min_lookahead_secs`
///   along [`blended_direction`] at live speed.
pub fn continuation_point(
    state: &KinematicState,
    protected: &[Waypoint],
    target: &KinematicState,
    tuning: &SchedulerTuning,
) -> Continuation {
    if protected.is_empty() {
        return extrapolated(state, target, tuning);
    }

    let mut from = state.position;
    let mut speed = state.speed();
    let mut direction = state.travel_direction();
    let mut lead_time = 0.0;
    for waypoint in protected {
        let leg = waypoint.position - from;
        let length = leg.length();
        if length > 1e-9 {
            direction = leg / length;
        }
        let mean = 0.5 * (speed + waypoint.target_speed);
        if mean > 1e-6 {
            lead_time += length / mean;
        }
        from = waypoint.position;
        speed = waypoint.target_speed;
    }

    Continuation {
        position: from,
        direction,
        speed,
        lead_time,
    }
}

fn extrapolated(
    state: &KinematicState,
    target: &KinematicState,
    tuning: &SchedulerTuning,
) -> Continuation {
    let speed = state.speed();
    let direction = blended_direction(state, target, tuning.continuation_blend_range);
    let lookahead = tuning.continuation_min_lookahead_secs;
    Continuation {
        position: state.position + direction * speed * lookahead,
        direction,
        speed,
        lead_time: lookahead,
    }
}

/// Unit direction from velocity toward the target, weighted by range.
///
/// All velocity beyond `blend_range`, all target at zero range. A target
/// abeam or behind leaves the velocity direction alone: the point never
/// bends back against the flight path.
pub fn blended_direction(state: &KinematicState, target: &KinematicState, blend_range: f64) -> Vec2 {
    let travel = state.travel_direction();
    let to_target = target.position - state.position;
    let range = to_target.length();
    if range < 1e-6 || blend_range <= 0.0 || travel.dot(to_target) <= 0.0 {
        return travel;
    }
    let w = (1.0 - range / blend_range).clamp(0.0, 1.0);
    let blended = travel * (1.0 - w) + (to_target / range) * w;
    if blended.length_squared() > 1e-12 {
        blended.normalize()
    } else {
        travel
    }
}
