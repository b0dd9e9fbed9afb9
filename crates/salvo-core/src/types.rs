//! Fundamental geometric and simulation types.

use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

/// 2D vector in simulation space (meters or m/s). x = East, y = North.
pub type Vec2 = glam::DVec2;

/// Kinematic snapshot of a munition or target.
///
/// Always copied, never borrowed across ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    /// Position (meters).
    pub position: Vec2,
    /// Velocity (m/s).
    pub velocity: Vec2,
    /// Nose direction in radians, counter-clockwise from +x.
    pub heading: f64,
    /// Maximum thrust acceleration (m/s²).
    pub max_acceleration: f64,
    /// Maximum rotation rate (rad/s).
    pub max_rotation_rate: f64,
}

impl KinematicState {
    /// A state with only position and velocity set; heading follows velocity.
    pub fn point(position: Vec2, velocity: Vec2) -> Self {
        let heading = if velocity.length_squared() > 0.0 {
            velocity.y.atan2(velocity.x)
        } else {
            0.0
        };
        Self {
            position,
            velocity,
            heading,
            max_acceleration: 0.0,
            max_rotation_rate: 0.0,
        }
    }

    /// Speed magnitude (m/s).
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Unit vector along the nose.
    pub fn heading_vector(&self) -> Vec2 {
        Vec2::from_angle(self.heading)
    }

    /// Unit vector along the velocity, or along the nose when nearly stationary.
    pub fn travel_direction(&self) -> Vec2 {
        if self.velocity.length_squared() > 1e-6 {
            self.velocity.normalize()
        } else {
            self.heading_vector()
        }
    }

    /// Range to another state's position (meters).
    pub fn range_to(&self, other: &KinematicState) -> f64 {
        self.position.distance(other.position)
    }

    /// Position after coasting for `secs` at constant velocity.
    pub fn extrapolate(&self, secs: f64) -> Vec2 {
        self.position + self.velocity * secs
    }

    /// Whether every field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.heading.is_finite()
            && self.max_acceleration.is_finite()
            && self.max_rotation_rate.is_finite()
    }
}

/// Per-tick actuator command for a munition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GuidanceCommand {
    /// Commanded rotation rate (rad/s, positive = counter-clockwise).
    pub rotation_rate: f64,
    /// Commanded thrust as a fraction of max acceleration (0.0 - 1.0).
    pub thrust_fraction: f64,
}

impl GuidanceCommand {
    /// Hold heading, no thrust.
    pub const COAST: GuidanceCommand = GuidanceCommand {
        rotation_rate: 0.0,
        thrust_fraction: 0.0,
    };
}

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Wrap an angle into (-PI, PI].
pub fn wrap_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Signed angle from `from` to `to` in (-PI, PI]. Zero if either is degenerate.
pub fn signed_angle(from: Vec2, to: Vec2) -> f64 {
    if from.length_squared() < 1e-12 || to.length_squared() < 1e-12 {
        return 0.0;
    }
    from.perp_dot(to).atan2(from.dot(to))
}

/// Unsigned angle between two directions in [0, PI].
pub fn angle_between(a: Vec2, b: Vec2) -> f64 {
    signed_angle(a, b).abs()
}
