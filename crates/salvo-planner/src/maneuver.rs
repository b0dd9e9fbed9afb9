//! Flip-and-burn: when the turn a plan needs is too wide for the remaining
//! distance, slow down along the velocity line first.
//!
//! The prefix is a Flip waypoint (rotate the nose to retrograde while
//! coasting), then a Burn waypoint (decelerate to a speed whose turn radius
//! fits). Geometry for the archetype then resumes from the end of the burn.

use std::f64::consts::PI;

use salvo_core::config::{ArchetypeTuning, PlannerTuning};
use salvo_core::enums::ManeuverKind;
use salvo_core::planning::Continuation;
use salvo_core::sequence::Waypoint;
use salvo_core::types::{angle_between, Vec2};

/// Minimum radius of curvature at `speed` with `lateral_accel` available.
pub fn turn_radius(speed: f64, lateral_accel: f64) -> f64 {
    if lateral_accel <= 0.0 {
        return f64::INFINITY;
    }
    speed * speed / lateral_accel
}

/// Speed whose turn radius is the safety-margined share of `distance`.
pub fn turn_speed(distance: f64, lateral_accel: f64, tuning: &PlannerTuning) -> f64 {
    (tuning.turn_safety_margin * distance * lateral_accel.max(0.0)).sqrt()
}

/// Whether turning through `turn_angle` at the origin speed needs more room
/// than the margined engagement distance allows.
pub fn needs_flip(
    origin: &Continuation,
    turn_angle: f64,
    distance: f64,
    lateral_accel: f64,
    tuning: &PlannerTuning,
) -> bool {
    if turn_angle <= tuning.turn_angle_threshold {
        return false;
    }
    let footprint = turn_radius(origin.speed, lateral_accel) * (1.0 - turn_angle.min(PI).cos());
    footprint > tuning.turn_safety_margin * distance
        && origin.speed > turn_speed(distance, lateral_accel, tuning)
}

/// Seconds to rotate the nose through 180°.
pub fn flip_duration(max_rotation_rate: f64) -> f64 {
    PI / max_rotation_rate
}

/// Waypoints of a flip-and-burn prefix and the state the munition is left in.
#[derive(Debug, Clone)]
pub struct Prefix {
    pub waypoints: Vec<Waypoint>,
    pub origin: Continuation,
}

/// Flip to retrograde, then burn down to the turn speed for `distance`.
pub fn flip_and_burn(
    origin: &Continuation,
    distance: f64,
    max_acceleration: f64,
    max_rotation_rate: f64,
    arch: &ArchetypeTuning,
    tuning: &PlannerTuning,
) -> Prefix {
    let dir = origin.direction;
    let v0 = origin.speed;
    let t_flip = flip_duration(max_rotation_rate);
    let flip_at = origin.position + dir * v0 * t_flip;

    let mut waypoints = vec![Waypoint::new(flip_at, v0, ManeuverKind::Flip)
        .with_tolerances(arch.acceptance_radius, arch.speed_tolerance)];

    let lateral = max_acceleration * arch.lateral_fraction;
    let braking = max_acceleration * arch.accel_fraction;
    let v_turn = turn_speed(distance, lateral, tuning).min(v0);
    let burn_len = (v0 * v0 - v_turn * v_turn) / (2.0 * braking);
    let burn_time = (v0 - v_turn) / braking;

    if burn_len < tuning.min_spacing {
        return Prefix {
            waypoints,
            origin: Continuation {
                position: flip_at,
                direction: dir,
                speed: v0,
                lead_time: origin.lead_time + t_flip,
            },
        };
    }

    let burn_at = flip_at + dir * burn_len;
    waypoints.push(
        Waypoint::new(burn_at, v_turn, ManeuverKind::Burn)
            .with_tolerances(arch.acceptance_radius, arch.speed_tolerance),
    );
    Prefix {
        waypoints,
        origin: Continuation {
            position: burn_at,
            direction: dir,
            speed: v_turn,
            lead_time: origin.lead_time + t_flip + burn_time,
        },
    }
}

/// After a burn the nose points retrograde. If the first leg of the plan runs
/// close to the old direction of travel, rotate back before flying it.
pub fn second_flip(
    prefix: &mut Prefix,
    first_leg: Vec2,
    max_rotation_rate: f64,
    arch: &ArchetypeTuning,
    tuning: &PlannerTuning,
) -> bool {
    let nose = -prefix.origin.direction;
    if angle_between(nose, first_leg) <= tuning.second_flip_angle {
        return false;
    }
    let t_flip = flip_duration(max_rotation_rate);
    let o = prefix.origin;
    let flip_at = o.position + o.direction * o.speed * t_flip;
    prefix.waypoints.push(
        Waypoint::new(flip_at, o.speed, ManeuverKind::Flip)
            .with_tolerances(arch.acceptance_radius, arch.speed_tolerance),
    );
    prefix.origin = Continuation {
        position: flip_at,
        lead_time: o.lead_time + t_flip,
        ..o
    };
    true
}
