//! Enumeration types used throughout the guidance core.

use serde::{Deserialize, Serialize};

/// What the munition should be doing while it pursues a waypoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManeuverKind {
    /// Hold speed toward the waypoint.
    #[default]
    Cruise,
    /// Accelerate toward the waypoint.
    Boost,
    /// Rotate 180° in place, no thrust.
    Flip,
    /// Thrust along or against velocity until the target speed is matched.
    Burn,
    /// Follow a planned arc.
    Curve,
    /// Final approach to the intercept point.
    Terminal,
}

/// Archetype family, used to look up per-archetype tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArchetypeKind {
    Direct,
    OffsetAngle,
    Coordinated,
}

/// Named trajectory strategy assigned at launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TrajectoryArchetype {
    /// Straight to the lead intercept point with a monotonic speed profile.
    #[default]
    Direct,
    /// Build leg, then an arc onto an assigned approach angle.
    OffsetAngle {
        /// Final approach direction relative to the reference bearing
        /// (radians, positive = CCW).
        approach_angle: f64,
        /// Angle between the approaches of neighbouring slots (radians).
        separation: f64,
    },
    /// Fan out across a bounded arc, then converge on a shared impact time.
    Coordinated {
        /// Total width of the fan of approach directions, centred on the
        /// reference bearing (radians).
        fan_arc: f64,
    },
}

impl TrajectoryArchetype {
    pub fn kind(&self) -> ArchetypeKind {
        match self {
            Self::Direct => ArchetypeKind::Direct,
            Self::OffsetAngle { .. } => ArchetypeKind::OffsetAngle,
            Self::Coordinated { .. } => ArchetypeKind::Coordinated,
        }
    }
}

/// Execution controller state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidanceMode {
    /// Proportional navigation toward the current waypoint (cruise, boost, curve).
    #[default]
    CruiseToWaypoint,
    /// Rotating to the reciprocal heading.
    Flip,
    /// Matching the waypoint's target speed along the velocity line.
    Burn,
    /// Final approach.
    Terminal,
    /// No usable waypoint or target: hold heading, no thrust.
    Coast,
}

impl GuidanceMode {
    /// Mode implied by the kind of the waypoint being pursued.
    pub fn for_maneuver(kind: ManeuverKind) -> Self {
        match kind {
            ManeuverKind::Flip => Self::Flip,
            ManeuverKind::Burn => Self::Burn,
            ManeuverKind::Terminal => Self::Terminal,
            ManeuverKind::Cruise | ManeuverKind::Boost | ManeuverKind::Curve => {
                Self::CruiseToWaypoint
            }
        }
    }
}

/// Munition lifecycle as seen by the core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MunitionStatus {
    #[default]
    Active,
    /// Destroyed by a collaborator; despawned at the end of the tick.
    MarkedForRemoval,
}

/// Target lifecycle as reported by the target feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetStatus {
    #[default]
    Tracked,
    Destroyed,
}

/// How the scheduler waits for the compute backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanningMode {
    /// Dispatch and await the batch inside the scheduling tick.
    #[default]
    Synchronous,
    /// Dispatch and poll the result queue on later ticks.
    Pipelined,
}

/// Why the execution controller advanced past a waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcceptReason {
    /// Inside the acceptance radius.
    Reached,
    /// Speed matched while closing.
    SpeedMatched,
    /// Velocity points away from a nearby waypoint.
    Overshot,
    /// Flip rotation finished.
    FlipComplete,
}

/// Why the state collector left a munition out of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Marked for removal.
    NotActive,
    /// No target assigned or the target no longer exists.
    NoTarget,
    /// A kinematic value is NaN or infinite.
    NonFinite,
    /// A kinematic value is outside sane magnitude bounds.
    OutOfRange,
}

/// Built-in demonstration scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioId {
    /// One munition against an inbound target.
    Direct,
    /// Two munitions with separated approach angles.
    OffsetPair,
    /// A coordinated group sharing one impact time.
    Coordinated,
    /// A fast munition flying away from its required approach.
    FlipBurn,
    /// Hundreds of munitions against several targets.
    Swarm,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 5] = [
        ScenarioId::Direct,
        ScenarioId::OffsetPair,
        ScenarioId::Coordinated,
        ScenarioId::FlipBurn,
        ScenarioId::Swarm,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Direct => "direct",
            ScenarioId::OffsetPair => "offset-pair",
            ScenarioId::Coordinated => "coordinated",
            ScenarioId::FlipBurn => "flip-burn",
            ScenarioId::Swarm => "swarm",
        }
    }

    pub fn from_name(name: &str) -> Option<ScenarioId> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}
