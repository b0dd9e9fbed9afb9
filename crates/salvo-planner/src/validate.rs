//! Physical feasibility checks on a planned tail.
//!
//! The tail is checked as flown from the continuation point: the first
//! segment starts there at the continuation speed, and the turn out of the
//! continuation direction into that segment is a corner like any other.

use salvo_core::config::PlannerTuning;
use salvo_core::enums::ManeuverKind;
use salvo_core::error::PlanFault;
use salvo_core::planning::Continuation;
use salvo_core::sequence::Waypoint;
use salvo_core::types::angle_between;

/// Check spacing, speed changes and turns. The first violation wins.
pub fn validate_tail(
    start: &Continuation,
    tail: &[Waypoint],
    max_acceleration: f64,
    tuning: &PlannerTuning,
) -> Result<(), PlanFault> {
    if tail.is_empty() {
        return Err(PlanFault::EmptyTail);
    }
    for (index, wp) in tail.iter().enumerate() {
        if !is_finite(wp) {
            return Err(PlanFault::NonFinite { index });
        }
    }

    let mut prev_position = start.position;
    let mut prev_speed = start.speed;
    for (index, wp) in tail.iter().enumerate() {
        let length = prev_position.distance(wp.position);
        if index > 0 && length < tuning.min_spacing {
            return Err(PlanFault::SpacingTooSmall {
                index,
                spacing: length,
            });
        }

        let delta_v = (wp.target_speed - prev_speed).abs();
        let mean_speed = 0.5 * (wp.target_speed + prev_speed);
        if delta_v > 0.0 {
            let available = if mean_speed > 1e-9 {
                max_acceleration * length / mean_speed
            } else {
                0.0
            };
            if delta_v > available * (1.0 + 1e-6) + 1e-9 {
                return Err(PlanFault::VelocityChangeInfeasible {
                    index,
                    delta_v,
                    available,
                });
            }
        }

        prev_position = wp.position;
        prev_speed = wp.target_speed;
    }

    // Seam: arriving along the continuation direction, leaving along the
    // first leg. Only the first leg's length is known to be free.
    let first_leg = tail[0].position - start.position;
    if first_leg.length_squared() > 1e-12
        && angle_between(start.direction, first_leg) > tuning.turn_angle_threshold
    {
        let radius = start.speed * start.speed / max_acceleration;
        let available = first_leg.length();
        if radius > available {
            return Err(PlanFault::TurnRadiusExceeded {
                index: 0,
                radius,
                available,
            });
        }
    }

    for index in 0..tail.len().saturating_sub(1) {
        let here = &tail[index];
        // A flip turns the nose, not the flight path.
        if here.kind == ManeuverKind::Flip {
            continue;
        }
        let before = if index == 0 {
            start.position
        } else {
            tail[index - 1].position
        };
        let incoming = here.position - before;
        let outgoing = tail[index + 1].position - here.position;
        if incoming.length_squared() < 1e-12 || outgoing.length_squared() < 1e-12 {
            continue;
        }
        if angle_between(incoming, outgoing) <= tuning.turn_angle_threshold {
            continue;
        }
        let radius = here.target_speed * here.target_speed / max_acceleration;
        let available = incoming.length().min(outgoing.length());
        if radius > available {
            return Err(PlanFault::TurnRadiusExceeded {
                index,
                radius,
                available,
            });
        }
    }

    Ok(())
}

fn is_finite(wp: &Waypoint) -> bool {
    wp.position.is_finite()
        && wp.target_speed.is_finite()
        && wp.speed_tolerance.is_finite()
        && wp.acceptance_radius.is_finite()
        && wp.thrust_cap.map_or(true, f64::is_finite)
}
