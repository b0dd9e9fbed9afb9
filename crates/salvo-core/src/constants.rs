//! Simulation constants and default tuning values.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- Scheduling ---

/// Waypoints at and after the current index that a merge may not overwrite.
pub const DEFAULT_PROTECTED_COUNT: usize = 3;

/// Time-to-impact at or above which planning runs at 1 Hz (seconds).
pub const RATE_SLOW_TTI: f64 = 15.0;

/// Time-to-impact at or above which planning runs at 2 Hz (seconds).
pub const RATE_MEDIUM_TTI: f64 = 10.0;

/// Time-to-impact at or above which planning runs at 3 Hz (seconds).
/// Below this the rate stays capped at 3 Hz.
pub const RATE_FAST_TTI: f64 = 5.0;

/// Highest planning rate the scheduler will ever use (Hz).
pub const MAX_PLANNING_RATE_HZ: f64 = 3.0;

/// Shortest look-ahead used when extrapolating a continuation point (seconds).
pub const CONTINUATION_MIN_LOOKAHEAD_SECS: f64 = 0.5;

/// Range over which the continuation direction blends from velocity to target (meters).
pub const CONTINUATION_BLEND_RANGE: f64 = 20_000.0;

/// Extra time added to a coordinated group's impact time (seconds).
pub const COORDINATION_SLACK_SECS: f64 = 0.5;

// --- Planner ---

/// Minimum spacing between consecutive planned waypoints (meters).
pub const MIN_WAYPOINT_SPACING: f64 = 25.0;

/// Fraction of the remaining engagement distance a turn may consume before a
/// flip-and-burn is required.
pub const TURN_SAFETY_MARGIN: f64 = 0.5;

/// Direction changes above this angle are checked against the turn radius (radians, 15°).
pub const TURN_ANGLE_THRESHOLD: f64 = 0.2618;

/// Upper bound on waypoints in one planned tail.
pub const MAX_TAIL_WAYPOINTS: usize = 64;

/// Post-burn reorientation above this angle requires a second flip (radians, 150°).
pub const SECOND_FLIP_ANGLE: f64 = 2.618;

/// Straight final approach after the curve, in turn radii.
pub const APPROACH_LEG_RADII: f64 = 1.0;

/// Longest intercept time the planner searches (seconds).
pub const INTERCEPT_HORIZON_SECS: f64 = 600.0;

/// Default top speed for planned profiles (m/s).
pub const DEFAULT_MAX_SPEED: f64 = 8_000.0;

/// Default fraction of max acceleration the planner budgets for speed changes.
pub const DEFAULT_ACCEL_FRACTION: f64 = 0.9;

/// Default fraction of max acceleration the planner budgets for turning.
pub const DEFAULT_LATERAL_FRACTION: f64 = 0.8;

// --- Guidance ---

/// Proportional navigation constant while cruising (dimensionless, typically 3-5).
pub const PN_NAVIGATION_CONSTANT: f64 = 3.0;

/// Proportional navigation constant in the terminal phase.
pub const PN_TERMINAL_NAVIGATION_CONSTANT: f64 = 4.0;

/// Proportional gain from speed error to forward acceleration (1/s).
pub const SPEED_GAIN: f64 = 2.0;

/// Proportional gain from heading error to rotation rate (1/s).
pub const HEADING_GAIN: f64 = 6.0;

/// Heading error at which a flip counts as complete (radians).
pub const FLIP_TOLERANCE: f64 = 0.02;

/// Below this closing speed PN falls back to pure pursuit (m/s).
pub const MIN_CLOSING_SPEED: f64 = 10.0;

// --- Collector limits ---

/// Speeds above this are treated as corrupt state (m/s).
pub const MAX_SANE_SPEED: f64 = 100_000.0;

/// Positions farther than this from the origin are treated as corrupt (meters).
pub const MAX_SANE_POSITION: f64 = 1.0e9;

/// Accelerations above this are treated as corrupt (m/s²).
pub const MAX_SANE_ACCELERATION: f64 = 100_000.0;

/// Rotation rates above this are treated as corrupt (rad/s).
pub const MAX_SANE_ROTATION_RATE: f64 = 100.0;
