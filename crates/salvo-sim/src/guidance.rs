//! Velocity-matching guidance law for forward-only thrusters.
//!
//! Pure functions from (state, waypoint, tuning) to a rotation-rate and thrust
//! command. The airframe can only push along its nose, so every law first
//! decides which acceleration it wants, then points the nose at it and
//! throttles by how well the nose is aligned.

use std::f64::consts::PI;

use salvo_core::config::GuidanceTuning;
use salvo_core::enums::{AcceptReason, ManeuverKind};
use salvo_core::sequence::Waypoint;
use salvo_core::types::{signed_angle, wrap_angle, GuidanceCommand, KinematicState, Vec2};

/// Below this fraction of max acceleration the law holds heading and coasts.
const DEADBAND_FRACTION: f64 = 0.01;

/// Line-of-sight geometry from a munition to a stationary point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineOfSight {
    /// Unit vector toward the point.
    pub direction: Vec2,
    pub range: f64,
    /// Rate of approach along the line of sight (m/s, positive = closing).
    pub closing_speed: f64,
    /// Rotation rate of the line of sight (rad/s, positive = CCW).
    pub rate: f64,
}

impl LineOfSight {
    pub fn new(state: &KinematicState, point: Vec2) -> Self {
        let r = point - state.position;
        let range = r.length();
        if range < 1e-9 {
            return Self {
                direction: state.heading_vector(),
                range: 0.0,
                closing_speed: 0.0,
                rate: 0.0,
            };
        }
        let direction = r / range;
        Self {
            direction,
            range,
            closing_speed: state.velocity.dot(direction),
            // d/dt atan2(r) with r' = -v.
            rate: r.perp_dot(-state.velocity) / (range * range),
        }
    }

    /// Seconds until the point is reached at the current closing speed.
    pub fn time_to_go(&self) -> f64 {
        if self.closing_speed > 1e-6 {
            self.range / self.closing_speed
        } else {
            f64::INFINITY
        }
    }
}

/// Speed to hold now: the waypoint's target speed, blended toward the next
/// waypoint's within the look-ahead horizon.
pub fn commanded_speed(
    los: &LineOfSight,
    waypoint: &Waypoint,
    next: Option<&Waypoint>,
    tuning: &GuidanceTuning,
) -> f64 {
    let Some(next) = next else {
        return waypoint.target_speed;
    };
    let ttg = los.time_to_go();
    if tuning.lookahead_secs <= 0.0 || ttg >= tuning.lookahead_secs {
        return waypoint.target_speed;
    }
    let s = 1.0 - ttg / tuning.lookahead_secs;
    waypoint.target_speed + (next.target_speed - waypoint.target_speed) * s
}

/// Cruise, curve, boost and terminal pursuit.
///
/// Lateral acceleration comes from proportional navigation while closing and
/// from velocity-matching pursuit otherwise. Forward acceleration comes from
/// the speed error and is never negative: slowing down is a burn's job.
pub fn pursue(
    state: &KinematicState,
    waypoint: &Waypoint,
    next: Option<&Waypoint>,
    navigation_constant: f64,
    dt: f64,
    tuning: &GuidanceTuning,
) -> GuidanceCommand {
    let los = LineOfSight::new(state, waypoint.position);
    let speed = state.speed();
    let target_speed = commanded_speed(&los, waypoint, next, tuning);

    let wanted = if los.closing_speed > tuning.min_closing_speed && speed > 1e-6 {
        let along = state.velocity / speed;
        let lateral = navigation_constant * los.closing_speed * los.rate;
        let forward = (tuning.speed_gain * (target_speed - speed)).max(0.0);
        along.perp() * lateral + along * forward
    } else {
        // Not closing: steer the velocity vector onto the line of sight.
        let floor = tuning.pursuit_accel_fraction * state.max_acceleration;
        let desired = los.direction * target_speed.max(floor / tuning.speed_gain);
        let correction = (desired - state.velocity) * tuning.speed_gain;
        if correction.length() < floor && correction.length_squared() > 0.0 {
            correction.normalize() * floor
        } else {
            correction
        }
    };

    let mut command = point_and_thrust(state, wanted, dt, tuning);
    if let Some(cap) = waypoint.thrust_cap {
        command.thrust_fraction = command.thrust_fraction.min(cap);
    }
    command
}

/// Match the waypoint's target speed along the velocity line.
///
/// Too fast: nose retrograde and thrust. Too slow: nose toward the waypoint
/// and thrust.
pub fn burn(
    state: &KinematicState,
    waypoint: &Waypoint,
    dt: f64,
    tuning: &GuidanceTuning,
) -> GuidanceCommand {
    let speed = state.speed();
    let error = waypoint.target_speed - speed;
    let direction = if error < 0.0 && speed > 1e-6 {
        -state.velocity / speed
    } else {
        LineOfSight::new(state, waypoint.position).direction
    };
    let wanted = direction * (tuning.speed_gain * error.abs());
    let mut command = point_and_thrust(state, wanted, dt, tuning);
    if let Some(cap) = waypoint.thrust_cap {
        command.thrust_fraction = command.thrust_fraction.min(cap);
    }
    command
}

/// Rotate at full rate toward `goal_heading`, no thrust.
pub fn flip(state: &KinematicState, goal_heading: f64, dt: f64) -> GuidanceCommand {
    let error = wrap_angle(goal_heading - state.heading);
    let max_rate = state.max_rotation_rate;
    // Land on the goal instead of overshooting it in the last tick.
    let rate = if dt > 0.0 {
        (error / dt).clamp(-max_rate, max_rate)
    } else {
        max_rate.copysign(error)
    };
    GuidanceCommand {
        rotation_rate: rate,
        thrust_fraction: 0.0,
    }
}

/// Heading a flip rotates to: the reciprocal of the heading it starts from.
pub fn flip_goal(state: &KinematicState) -> f64 {
    wrap_angle(state.heading + PI)
}

/// Whether a flip toward `goal_heading` is done.
pub fn flip_complete(state: &KinematicState, goal_heading: f64, tuning: &GuidanceTuning) -> bool {
    wrap_angle(goal_heading - state.heading).abs() <= tuning.flip_tolerance
}

/// Acceptance test for the waypoint being pursued. Flips are accepted by
/// [`flip_complete`] instead.
pub fn accept(
    state: &KinematicState,
    waypoint: &Waypoint,
    tuning: &GuidanceTuning,
) -> Option<AcceptReason> {
    let los = LineOfSight::new(state, waypoint.position);
    if los.range <= waypoint.acceptance_radius {
        return Some(AcceptReason::Reached);
    }

    let speed_matched = (state.speed() - waypoint.target_speed).abs() <= waypoint.speed_tolerance;
    if speed_matched && los.closing_speed > 0.0 {
        let capturing = waypoint.kind == ManeuverKind::Burn
            || los.time_to_go() <= tuning.capture_time_secs;
        if capturing {
            return Some(AcceptReason::SpeedMatched);
        }
    }

    if los.closing_speed < 0.0 && los.range <= tuning.overshoot_distance {
        return Some(AcceptReason::Overshot);
    }
    None
}

/// Point the nose along `wanted` and throttle to its magnitude.
///
/// Thrust is scaled by nose alignment (no thrust while pointing away) and
/// cut further in proportion to the rotation rate.
fn point_and_thrust(
    state: &KinematicState,
    wanted: Vec2,
    dt: f64,
    tuning: &GuidanceTuning,
) -> GuidanceCommand {
    let max_accel = state.max_acceleration;
    let max_rate = state.max_rotation_rate;
    let magnitude = wanted.length();
    if max_accel <= 0.0 || !magnitude.is_finite() || magnitude < DEADBAND_FRACTION * max_accel {
        // Nothing to do: line the nose up with the velocity and coast.
        let hold = signed_angle(state.heading_vector(), state.travel_direction());
        return GuidanceCommand {
            rotation_rate: rotation_toward(hold, max_rate, dt, tuning),
            thrust_fraction: 0.0,
        };
    }

    let error = signed_angle(state.heading_vector(), wanted);
    let rotation_rate = rotation_toward(error, max_rate, dt, tuning);
    let alignment = error.cos().max(0.0);
    let coupling = if max_rate > 0.0 {
        1.0 - tuning.rotation_thrust_coupling * (rotation_rate.abs() / max_rate)
    } else {
        1.0
    };
    GuidanceCommand {
        rotation_rate,
        thrust_fraction: ((magnitude / max_accel) * alignment * coupling).clamp(0.0, 1.0),
    }
}

fn rotation_toward(error: f64, max_rate: f64, dt: f64, tuning: &GuidanceTuning) -> f64 {
    let mut rate = tuning.heading_gain * error;
    if dt > 0.0 {
        rate = rate.clamp(-error.abs() / dt, error.abs() / dt);
    }
    rate.clamp(-max_rate, max_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 30.0;

    fn munition(position: Vec2, velocity: Vec2) -> KinematicState {
        KinematicState {
            max_acceleration: 1_400.0,
            max_rotation_rate: 2.0,
            ..KinematicState::point(position, velocity)
        }
    }

    fn waypoint(x: f64, y: f64, speed: f64, kind: ManeuverKind) -> Waypoint {
        Waypoint::new(Vec2::new(x, y), speed, kind).with_tolerances(150.0, 50.0)
    }

    #[test]
    fn test_los_rate_sign() {
        // Moving east with the point to the north-east: the LOS swings CCW.
        let state = munition(Vec2::ZERO, Vec2::new(500.0, 0.0));
        let los = LineOfSight::new(&state, Vec2::new(1_000.0, 1_000.0));
        assert!(los.rate > 0.0);
        assert!(los.closing_speed > 0.0);
    }

    #[test]
    fn test_on_course_and_matched_coasts() {
        let state = munition(Vec2::ZERO, Vec2::new(800.0, 0.0));
        let cmd = pursue(
            &state,
            &waypoint(10_000.0, 0.0, 800.0, ManeuverKind::Cruise),
            None,
            3.0,
            DT,
            &GuidanceTuning::default(),
        );
        assert!(cmd.rotation_rate.abs() < 1e-9);
        assert_eq!(cmd.thrust_fraction, 0.0);
    }

    #[test]
    fn test_slow_munition_thrusts_forward() {
        let state = munition(Vec2::ZERO, Vec2::new(200.0, 0.0));
        let cmd = pursue(
            &state,
            &waypoint(10_000.0, 0.0, 800.0, ManeuverKind::Cruise),
            None,
            3.0,
            DT,
            &GuidanceTuning::default(),
        );
        assert!(cmd.thrust_fraction > 0.5);
        assert!(cmd.rotation_rate.abs() < 1e-9);
    }

    #[test]
    fn test_pn_turns_toward_offset_waypoint() {
        let state = munition(Vec2::ZERO, Vec2::new(800.0, 0.0));
        let cmd = pursue(
            &state,
            &waypoint(5_000.0, 2_000.0, 800.0, ManeuverKind::Curve),
            None,
            3.0,
            DT,
            &GuidanceTuning::default(),
        );
        assert!(cmd.rotation_rate > 0.0, "should rotate CCW, got {cmd:?}");
    }

    #[test]
    fn test_pursuit_when_not_closing() {
        // Waypoint behind: PN is meaningless, pursuit points the nose back.
        let state = munition(Vec2::ZERO, Vec2::new(50.0, 0.0));
        let cmd = pursue(
            &state,
            &waypoint(-5_000.0, 100.0, 300.0, ManeuverKind::Cruise),
            None,
            3.0,
            DT,
            &GuidanceTuning::default(),
        );
        assert!(cmd.rotation_rate.abs() > 1.0);
    }

    #[test]
    fn test_lookahead_blends_speed() {
        let state = munition(Vec2::ZERO, Vec2::new(1_000.0, 0.0));
        let tuning = GuidanceTuning::default();
        let near = waypoint(500.0, 0.0, 1_000.0, ManeuverKind::Cruise);
        let next = waypoint(5_000.0, 0.0, 2_000.0, ManeuverKind::Cruise);
        let los = LineOfSight::new(&state, near.position);
        let speed = commanded_speed(&los, &near, Some(&next), &tuning);
        assert!(speed > 1_000.0 && speed < 2_000.0);

        let far = waypoint(50_000.0, 0.0, 1_000.0, ManeuverKind::Cruise);
        let los = LineOfSight::new(&state, far.position);
        assert_eq!(commanded_speed(&los, &far, Some(&next), &tuning), 1_000.0);
    }

    #[test]
    fn test_rotation_cuts_thrust() {
        let tuning = GuidanceTuning::default();
        let state = munition(Vec2::ZERO, Vec2::new(100.0, 0.0));
        // Wanted acceleration 30° off the nose.
        let wanted = Vec2::from_angle(0.5) * 1_400.0;
        let cmd = point_and_thrust(&state, wanted, DT, &tuning);
        assert!(cmd.rotation_rate > 0.0);
        assert!(cmd.thrust_fraction < 0.5_f64.cos());
    }

    #[test]
    fn test_burn_points_retrograde_when_fast() {
        let mut state = munition(Vec2::ZERO, Vec2::new(3_000.0, 0.0));
        state.heading = PI;
        let cmd = burn(
            &state,
            &waypoint(9_000.0, 0.0, 1_000.0, ManeuverKind::Burn),
            DT,
            &GuidanceTuning::default(),
        );
        assert_eq!(cmd.thrust_fraction, 1.0);
        assert!(cmd.rotation_rate.abs() < 1e-9);
    }

    #[test]
    fn test_flip_rotates_at_max_rate() {
        let state = munition(Vec2::ZERO, Vec2::new(3_000.0, 0.0));
        let goal = flip_goal(&state);
        assert!((wrap_angle(goal - PI)).abs() < 1e-9);
        let cmd = flip(&state, goal, DT);
        assert_eq!(cmd.rotation_rate.abs(), 2.0);
        assert_eq!(cmd.thrust_fraction, 0.0);
        assert!(!flip_complete(&state, goal, &GuidanceTuning::default()));
    }

    #[test]
    fn test_flip_lands_on_goal() {
        let mut state = munition(Vec2::ZERO, Vec2::new(3_000.0, 0.0));
        state.heading = PI - 0.01;
        let cmd = flip(&state, PI, DT);
        assert!((cmd.rotation_rate - 0.01 / DT).abs() < 1e-9);
    }

    #[test]
    fn test_accept_reached() {
        let state = munition(Vec2::new(9_900.0, 0.0), Vec2::new(800.0, 0.0));
        let wp = waypoint(10_000.0, 0.0, 200.0, ManeuverKind::Cruise);
        assert_eq!(
            accept(&state, &wp, &GuidanceTuning::default()),
            Some(AcceptReason::Reached)
        );
    }

    #[test]
    fn test_accept_speed_matched_needs_capture() {
        let tuning = GuidanceTuning::default();
        let wp = waypoint(10_000.0, 0.0, 800.0, ManeuverKind::Cruise);
        let far = munition(Vec2::ZERO, Vec2::new(800.0, 0.0));
        assert_eq!(accept(&far, &wp, &tuning), None);
        let near = munition(Vec2::new(9_700.0, 0.0), Vec2::new(800.0, 0.0));
        assert_eq!(accept(&near, &wp, &tuning), Some(AcceptReason::SpeedMatched));
    }

    #[test]
    fn test_accept_burn_on_speed_alone() {
        let wp = waypoint(50_000.0, 0.0, 800.0, ManeuverKind::Burn);
        let state = munition(Vec2::ZERO, Vec2::new(820.0, 0.0));
        assert_eq!(
            accept(&state, &wp, &GuidanceTuning::default()),
            Some(AcceptReason::SpeedMatched)
        );
    }

    #[test]
    fn test_accept_overshoot() {
        let tuning = GuidanceTuning::default();
        let wp = waypoint(1_000.0, 300.0, 3_000.0, ManeuverKind::Cruise);
        let passed = munition(Vec2::new(1_200.0, 0.0), Vec2::new(3_000.0, 0.0));
        assert_eq!(accept(&passed, &wp, &tuning), Some(AcceptReason::Overshot));
        let gone = munition(Vec2::new(5_000.0, 0.0), Vec2::new(3_000.0, 0.0));
        assert_eq!(accept(&gone, &wp, &tuning), None);
    }

    #[test]
    fn test_thrust_cap_applies() {
        let state = munition(Vec2::ZERO, Vec2::new(100.0, 0.0));
        let wp = waypoint(10_000.0, 0.0, 2_000.0, ManeuverKind::Boost).with_thrust_cap(0.3);
        let cmd = pursue(&state, &wp, None, 3.0, DT, &GuidanceTuning::default());
        assert!(cmd.thrust_fraction <= 0.3);
    }
}
