//! Tuning context shared by the scheduler, planner and execution controller.
//!
//! Built once at start-up (defaults or a JSON file) and handed out by `Arc`.
//! Every struct uses `#[serde(default)]`, so a file only needs the fields it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::enums::{ArchetypeKind, PlanningMode};
use crate::error::ConfigError;

/// All tuning for one core instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalvoConfig {
    pub scheduler: SchedulerTuning,
    pub planner: PlannerTuning,
    pub guidance: GuidanceTuning,
    pub limits: ValidationLimits,
    pub backend: BackendTuning,
}

impl SalvoConfig {
    /// Parse and validate tuning from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SalvoConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON tuning file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Reject values that would make the core misbehave rather than fail loudly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.protected_count == 0 {
            return Err(invalid("scheduler.protected_count", "must be at least 1"));
        }
        if !is_positive(self.scheduler.max_rate_hz) {
            return Err(invalid("scheduler.max_rate_hz", "must be positive"));
        }
        for kind in [
            ArchetypeKind::Direct,
            ArchetypeKind::OffsetAngle,
            ArchetypeKind::Coordinated,
        ] {
            self.planner.archetype(kind).validate()?;
        }
        if !is_fraction(self.planner.turn_safety_margin) {
            return Err(invalid("planner.turn_safety_margin", "must be in (0, 1]"));
        }
        if !is_positive(self.planner.turn_angle_threshold) {
            return Err(invalid("planner.turn_angle_threshold", "must be positive"));
        }
        if self.planner.max_waypoints < 2 {
            return Err(invalid("planner.max_waypoints", "must be at least 2"));
        }
        if self.planner.approach_leg_radii < 0.0 || !self.planner.approach_leg_radii.is_finite() {
            return Err(invalid("planner.approach_leg_radii", "must be non-negative"));
        }
        if !(is_positive(self.guidance.speed_gain) && is_positive(self.guidance.heading_gain)) {
            return Err(invalid("guidance gains", "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.guidance.rotation_thrust_coupling) {
            return Err(invalid("guidance.rotation_thrust_coupling", "must be in [0, 1]"));
        }
        Ok(())
    }
}

/// False for NaN as well as for non-positive values.
fn is_positive(value: f64) -> bool {
    value > 0.0
}

/// In (0, 1].
fn is_fraction(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

/// Planning cadence and merge policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerTuning {
    /// Waypoints from the current index that a merge may not replace.
    pub protected_count: usize,
    /// Time-to-impact thresholds (seconds) for 1 Hz, 2 Hz and 3 Hz.
    pub slow_tti: f64,
    pub medium_tti: f64,
    pub fast_tti: f64,
    /// Planning never runs faster than this (Hz).
    pub max_rate_hz: f64,
    /// Shortest continuation look-ahead (seconds).
    pub continuation_min_lookahead_secs: f64,
    /// Range over which the continuation direction blends toward the target (meters).
    pub continuation_blend_range: f64,
    /// Added to a coordinated group's earliest common impact time (seconds).
    pub coordination_slack_secs: f64,
}

impl Default for SchedulerTuning {
    fn default() -> Self {
        Self {
            protected_count: DEFAULT_PROTECTED_COUNT,
            slow_tti: RATE_SLOW_TTI,
            medium_tti: RATE_MEDIUM_TTI,
            fast_tti: RATE_FAST_TTI,
            max_rate_hz: MAX_PLANNING_RATE_HZ,
            continuation_min_lookahead_secs: CONTINUATION_MIN_LOOKAHEAD_SECS,
            continuation_blend_range: CONTINUATION_BLEND_RANGE,
            coordination_slack_secs: COORDINATION_SLACK_SECS,
        }
    }
}

/// Tuning that differs per trajectory archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchetypeTuning {
    /// Distance at which a waypoint counts as reached (meters).
    pub acceptance_radius: f64,
    /// Half-width of the speed band attached to each waypoint (m/s).
    pub speed_tolerance: f64,
    /// Top speed of planned profiles (m/s).
    pub max_speed: f64,
    /// Fraction of max acceleration budgeted for speed changes.
    pub accel_fraction: f64,
    /// Nominal straight-leg waypoint spacing (meters).
    pub segment_length: f64,
    /// Fraction of max acceleration budgeted for turning.
    pub lateral_fraction: f64,
}

impl Default for ArchetypeTuning {
    fn default() -> Self {
        Self {
            acceptance_radius: 150.0,
            speed_tolerance: 50.0,
            max_speed: DEFAULT_MAX_SPEED,
            accel_fraction: DEFAULT_ACCEL_FRACTION,
            segment_length: 2_000.0,
            lateral_fraction: DEFAULT_LATERAL_FRACTION,
        }
    }
}

impl ArchetypeTuning {
    fn validate(&self) -> Result<(), ConfigError> {
        if !is_positive(self.acceptance_radius) {
            return Err(invalid("planner.*.acceptance_radius", "must be positive"));
        }
        if !is_positive(self.speed_tolerance) {
            return Err(invalid("planner.*.speed_tolerance", "must be positive"));
        }
        if !is_positive(self.max_speed) {
            return Err(invalid("planner.*.max_speed", "must be positive"));
        }
        if !is_fraction(self.accel_fraction) {
            return Err(invalid("planner.*.accel_fraction", "must be in (0, 1]"));
        }
        if !is_fraction(self.lateral_fraction) {
            return Err(invalid("planner.*.lateral_fraction", "must be in (0, 1]"));
        }
        if !is_positive(self.segment_length) {
            return Err(invalid("planner.*.segment_length", "must be positive"));
        }
        Ok(())
    }
}

/// Trajectory planner tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerTuning {
    pub direct: ArchetypeTuning,
    pub offset_angle: ArchetypeTuning,
    pub coordinated: ArchetypeTuning,
    /// Minimum distance between consecutive tail waypoints (meters).
    pub min_spacing: f64,
    /// Fraction of the engagement distance a turn may use before flipping.
    pub turn_safety_margin: f64,
    /// Direction changes above this are turn-radius checked (radians).
    pub turn_angle_threshold: f64,
    /// Soft cap on straight-leg waypoints per tail.
    pub max_waypoints: usize,
    /// Post-burn reorientation above this needs a second flip (radians).
    pub second_flip_angle: f64,
    /// Straight final approach after the curve onto the approach line, in turn radii.
    pub approach_leg_radii: f64,
    /// Longest intercept time searched (seconds).
    pub intercept_horizon_secs: f64,
}

impl Default for PlannerTuning {
    fn default() -> Self {
        Self {
            direct: ArchetypeTuning::default(),
            offset_angle: ArchetypeTuning {
                acceptance_radius: 200.0,
                speed_tolerance: 75.0,
                max_speed: 3_000.0,
                ..ArchetypeTuning::default()
            },
            coordinated: ArchetypeTuning {
                acceptance_radius: 200.0,
                speed_tolerance: 75.0,
                max_speed: 4_000.0,
                ..ArchetypeTuning::default()
            },
            min_spacing: MIN_WAYPOINT_SPACING,
            turn_safety_margin: TURN_SAFETY_MARGIN,
            turn_angle_threshold: TURN_ANGLE_THRESHOLD,
            max_waypoints: MAX_TAIL_WAYPOINTS,
            second_flip_angle: SECOND_FLIP_ANGLE,
            approach_leg_radii: APPROACH_LEG_RADII,
            intercept_horizon_secs: INTERCEPT_HORIZON_SECS,
        }
    }
}

impl PlannerTuning {
    pub fn archetype(&self, kind: ArchetypeKind) -> &ArchetypeTuning {
        match kind {
            ArchetypeKind::Direct => &self.direct,
            ArchetypeKind::OffsetAngle => &self.offset_angle,
            ArchetypeKind::Coordinated => &self.coordinated,
        }
    }
}

/// Execution controller tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidanceTuning {
    /// PN constant N while cruising.
    pub navigation_constant: f64,
    /// PN constant N in the terminal phase.
    pub terminal_navigation_constant: f64,
    /// Speed error to forward acceleration (1/s).
    pub speed_gain: f64,
    /// Heading error to rotation rate (1/s).
    pub heading_gain: f64,
    /// Within this many seconds of a waypoint, blend toward the next one's speed.
    pub lookahead_secs: f64,
    /// Thrust reduction at full rotation rate (0 = none, 1 = thrust cut to zero).
    pub rotation_thrust_coupling: f64,
    /// Heading error at which a flip is complete (radians).
    pub flip_tolerance: f64,
    /// Speed-matched acceptance only applies within this many seconds of the waypoint.
    pub capture_time_secs: f64,
    /// Overshoot acceptance only applies within this distance (meters).
    pub overshoot_distance: f64,
    /// Below this closing speed PN falls back to pure pursuit (m/s).
    pub min_closing_speed: f64,
    /// Minimum pursuit acceleration as a fraction of max acceleration.
    pub pursuit_accel_fraction: f64,
    /// Weight of the newest sample in the metrics moving averages.
    pub metrics_smoothing: f64,
}

impl Default for GuidanceTuning {
    fn default() -> Self {
        Self {
            navigation_constant: PN_NAVIGATION_CONSTANT,
            terminal_navigation_constant: PN_TERMINAL_NAVIGATION_CONSTANT,
            speed_gain: SPEED_GAIN,
            heading_gain: HEADING_GAIN,
            lookahead_secs: 1.0,
            rotation_thrust_coupling: 0.5,
            flip_tolerance: FLIP_TOLERANCE,
            capture_time_secs: 0.5,
            overshoot_distance: 500.0,
            min_closing_speed: MIN_CLOSING_SPEED,
            pursuit_accel_fraction: 0.5,
            metrics_smoothing: 0.1,
        }
    }
}

/// Sanity bounds applied by the state collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationLimits {
    pub max_speed: f64,
    pub max_position: f64,
    pub max_acceleration: f64,
    pub max_rotation_rate: f64,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_speed: MAX_SANE_SPEED,
            max_position: MAX_SANE_POSITION,
            max_acceleration: MAX_SANE_ACCELERATION,
            max_rotation_rate: MAX_SANE_ROTATION_RATE,
        }
    }
}

/// Compute backend settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendTuning {
    /// Worker lanes; 0 lets the pool pick one per core.
    pub worker_threads: usize,
    pub mode: PlanningMode,
}
