//! Per-archetype waypoint geometry.
//!
//! Each archetype grows a path from an origin (the continuation point, or the
//! end of a flip-and-burn prefix) and pairs it with a speed profile. Speeds and
//! maneuver kinds are attached to the points by [`finish`].

pub mod coordinated;
pub mod direct;
pub mod offset;

use std::f64::consts::TAU;

use salvo_core::config::{ArchetypeTuning, PlannerTuning};
use salvo_core::enums::{ManeuverKind, TrajectoryArchetype};
use salvo_core::error::PlanFault;
use salvo_core::planning::{Continuation, PlanningRequest, Slot};
use salvo_core::sequence::Waypoint;
use salvo_core::types::{angle_between, Vec2};

use crate::geometry::{arc_sweep, tangent_point, PathBuilder};
use crate::intercept::solve_intercept;
use crate::profile::SpeedProfile;

/// Everything a single request's geometry needs.
pub struct Context<'a> {
    pub req: &'a PlanningRequest,
    pub arch: &'a ArchetypeTuning,
    pub tuning: &'a PlannerTuning,
}

impl<'a> Context<'a> {
    pub fn new(req: &'a PlanningRequest, tuning: &'a PlannerTuning) -> Self {
        Self {
            req,
            arch: tuning.archetype(req.archetype.kind()),
            tuning,
        }
    }

    /// Acceleration budgeted for speed changes (m/s²).
    pub fn boost_accel(&self) -> f64 {
        self.req.munition.max_acceleration * self.arch.accel_fraction
    }

    /// Acceleration budgeted for turning (m/s²).
    pub fn lateral_accel(&self) -> f64 {
        self.req.munition.max_acceleration * self.arch.lateral_fraction
    }

    /// Accelerate to the archetype's top speed, never planning a slow-down.
    pub fn full_speed_profile(&self, origin: &Continuation) -> SpeedProfile {
        SpeedProfile::new(
            origin.speed,
            self.boost_accel(),
            self.arch.max_speed.max(origin.speed),
        )
    }

    /// Final approach direction for archetypes that constrain it.
    pub fn approach_direction(&self) -> Option<Vec2> {
        let reference = self.req.reference_bearing;
        match self.req.archetype {
            TrajectoryArchetype::Direct => None,
            TrajectoryArchetype::OffsetAngle {
                approach_angle,
                separation,
            } => Some(Vec2::from_angle(
                reference + approach_angle + self.req.slot.centred_offset() * separation,
            )),
            TrajectoryArchetype::Coordinated { fan_arc } => {
                Some(Vec2::from_angle(reference + fan_angle(fan_arc, self.req.slot)))
            }
        }
    }
}

/// Angle of a slot within a fan of width `fan_arc`, centred on zero.
pub fn fan_angle(fan_arc: f64, slot: Slot) -> f64 {
    if slot.count <= 1 {
        return 0.0;
    }
    let half = fan_arc.abs() / 2.0;
    (slot.centred_offset() * fan_arc / (slot.count - 1) as f64).clamp(-half, half)
}

/// A path grown from an origin, the profile flown along it, and the seconds
/// from the origin to the last point.
pub struct Body {
    pub origin: Vec2,
    pub path: PathBuilder,
    pub profile: SpeedProfile,
    pub arrival: f64,
}

impl Body {
    /// Direction of the first leg, if the path has one.
    pub fn first_leg(&self) -> Option<Vec2> {
        self.path
            .with_distances()
            .first()
            .map(|(p, _, _)| *p - self.origin)
            .filter(|d| d.length_squared() > 1e-12)
    }
}

/// Largest direction change the archetype asks for at `origin`, and the
/// distance to the target (meters).
pub fn required_turn(ctx: &Context, origin: &Continuation) -> (f64, f64) {
    let aim = ctx.req.target.extrapolate(origin.lead_time);
    let los = aim - origin.position;
    let mut turn = angle_between(origin.direction, los);
    if let Some(approach) = ctx.approach_direction() {
        turn = turn.max(angle_between(origin.direction, approach));
    }
    (turn, los.length())
}

/// Geometry for whichever archetype the request carries.
pub fn body(ctx: &Context, origin: &Continuation) -> Result<Body, PlanFault> {
    match ctx.req.archetype {
        TrajectoryArchetype::Direct => direct::body(ctx, origin),
        TrajectoryArchetype::OffsetAngle { .. } => offset::body(ctx, origin),
        TrajectoryArchetype::Coordinated { .. } => coordinated::body(ctx, origin),
    }
}

/// Attach speeds, tolerances and maneuver kinds to a body's points.
pub fn finish(body: &Body, arch: &ArchetypeTuning) -> Vec<Waypoint> {
    let points = body.path.with_distances();
    let last = points.len().saturating_sub(1);
    points
        .iter()
        .enumerate()
        .map(|(i, &(position, kind, s))| {
            let kind = if i == last {
                ManeuverKind::Terminal
            } else if kind == ManeuverKind::Cruise && body.profile.accelerating_at(s) {
                ManeuverKind::Boost
            } else {
                kind
            };
            Waypoint::new(position, body.profile.speed_at_distance(s), kind)
                .with_tolerances(arch.acceptance_radius, arch.speed_tolerance)
        })
        .collect()
}

/// Straight leg, arc of `radius`, then a straight final leg that arrives at
/// `aim` travelling along `approach`.
///
/// The arc ends at a point fixed by `aim`, `approach` and `radius` alone, so a
/// munition already flying this shape gets the same shape back on replanning.
pub fn approach_path(
    ctx: &Context,
    origin: &Continuation,
    aim: Vec2,
    approach: Vec2,
    radius: f64,
) -> Result<PathBuilder, PlanFault> {
    let tuning = ctx.tuning;
    let seg = ctx.arch.segment_length;
    let max_segments = tuning.max_waypoints;
    let mut path = PathBuilder::new(origin.position, tuning.min_spacing);

    let arc_end = aim - approach * radius * tuning.approach_leg_radii;
    let offset = approach.perp_dot(origin.position - arc_end);

    // Already on the approach line: fly it.
    if offset.abs() < tuning.min_spacing {
        path.line_to(aim, seg, max_segments, ManeuverKind::Cruise);
        return Ok(path);
    }

    let side = offset.signum();
    let center = arc_end + approach.perp() * side * radius;
    let join = tangent_point(origin.position, center, radius, side).ok_or(
        PlanFault::TurnRadiusExceeded {
            index: 0,
            radius,
            available: origin.position.distance(center),
        },
    )?;

    // Already on the circle: the arc starts here.
    if origin.position.distance(join) >= tuning.min_spacing {
        path.line_to(join, seg, max_segments, ManeuverKind::Cruise);
    }
    let mut sweep = arc_sweep(center, path.last(), arc_end, side);
    if sweep.abs() > TAU - 1e-3 {
        sweep = 0.0;
    }
    path.arc(
        center,
        sweep,
        0.8 * tuning.turn_angle_threshold,
        ManeuverKind::Curve,
    );
    path.line_to(aim, seg, max_segments, ManeuverKind::Cruise);

    if path.is_empty() {
        return Err(PlanFault::DegenerateGeometry);
    }
    Ok(path)
}

/// Intercept along an [`approach_path`] at the profile's speeds.
///
/// The curved path is longer than the line of sight, so the intercept is
/// re-solved with the extra length folded in.
pub fn curved_intercept(
    ctx: &Context,
    origin: &Continuation,
    profile: SpeedProfile,
    approach: Vec2,
    radius: f64,
) -> Result<Body, PlanFault> {
    let mut detour = 0.0;
    let mut shaped = None;
    for _ in 0..3 {
        let hit = solve_intercept(
            origin.position,
            origin.lead_time,
            &profile,
            &ctx.req.target,
            detour,
            ctx.tuning.intercept_horizon_secs,
        )
        .ok_or(PlanFault::NoIntercept)?;
        let path = approach_path(ctx, origin, hit.point, approach, radius)?;
        detour = (path.length() - origin.position.distance(hit.point)).max(0.0);
        shaped = Some(path);
    }
    let path = shaped.ok_or(PlanFault::DegenerateGeometry)?;
    let arrival = profile.time_at_distance(path.length());
    Ok(Body {
        origin: origin.position,
        path,
        profile,
        arrival,
    })
}
