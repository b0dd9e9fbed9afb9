//! Scenario definitions: hardcoded engagements for demos and end-to-end tests.
//!
//! A scenario is plain data (targets, then munitions pointing at them by
//! index). The engine spawns it. Only the swarm draws on the seeded RNG.

use std::f64::consts::{FRAC_PI_2, PI};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use salvo_core::components::Assignment;
use salvo_core::enums::{ScenarioId, TrajectoryArchetype};
use salvo_core::planning::Slot;
use salvo_core::types::{KinematicState, Vec2};

/// Standard airframe limits.
pub const MUNITION_MAX_ACCELERATION: f64 = 1_400.0;
pub const MUNITION_MAX_ROTATION_RATE: f64 = 2.0;

/// Munitions in the swarm scenario.
pub const SWARM_SIZE: usize = 240;

/// Targets in the swarm scenario.
pub const SWARM_TARGETS: usize = 6;

/// One munition to spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct MunitionSpawn {
    pub state: KinematicState,
    /// Index into [`ScenarioSetup::targets`].
    pub target: usize,
    pub assignment: Assignment,
}

/// Everything a scenario spawns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioSetup {
    pub targets: Vec<KinematicState>,
    pub munitions: Vec<MunitionSpawn>,
}

/// Build the setup for a given scenario.
pub fn build(scenario: ScenarioId, rng: &mut ChaCha8Rng) -> ScenarioSetup {
    match scenario {
        ScenarioId::Direct => build_direct(),
        ScenarioId::OffsetPair => build_offset_pair(),
        ScenarioId::Coordinated => build_coordinated(),
        ScenarioId::FlipBurn => build_flip_burn(),
        ScenarioId::Swarm => build_swarm(rng),
    }
}

/// A munition state with the standard airframe limits.
pub fn munition_state(position: Vec2, velocity: Vec2) -> KinematicState {
    KinematicState {
        max_acceleration: MUNITION_MAX_ACCELERATION,
        max_rotation_rate: MUNITION_MAX_ROTATION_RATE,
        ..KinematicState::point(position, velocity)
    }
}

/// Direct: one munition at rest, one inbound target 10 km east.
fn build_direct() -> ScenarioSetup {
    ScenarioSetup {
        targets: vec![KinematicState::point(
            Vec2::new(10_000.0, 0.0),
            Vec2::new(-500.0, 0.0),
        )],
        munitions: vec![MunitionSpawn {
            state: munition_state(Vec2::ZERO, Vec2::ZERO),
            target: 0,
            assignment: Assignment::direct(),
        }],
    }
}

/// Offset pair: two cruising munitions on approaches 0.6 rad apart,
/// centred 0.4 rad off the launch line of sight.
fn build_offset_pair() -> ScenarioSetup {
    let archetype = TrajectoryArchetype::OffsetAngle {
        approach_angle: 0.4,
        separation: 0.6,
    };
    let munitions = (0..2)
        .map(|i| MunitionSpawn {
            state: munition_state(
                Vec2::new(0.0, if i == 0 { -500.0 } else { 500.0 }),
                Vec2::new(400.0, 0.0),
            ),
            target: 0,
            assignment: Assignment {
                archetype,
                group: None,
                slot: Slot { index: i, count: 2 },
                reference_bearing: None,
            },
        })
        .collect();
    ScenarioSetup {
        targets: vec![KinematicState::point(
            Vec2::new(40_000.0, 5_000.0),
            Vec2::new(-200.0, 0.0),
        )],
        munitions,
    }
}

/// Coordinated: four munitions launched from different ranges, fanned over
/// 1.2 rad, sharing one impact time.
fn build_coordinated() -> ScenarioSetup {
    let archetype = TrajectoryArchetype::Coordinated { fan_arc: 1.2 };
    let starts = [
        Vec2::new(0.0, -3_000.0),
        Vec2::new(-6_000.0, -1_000.0),
        Vec2::new(-2_000.0, 1_000.0),
        Vec2::new(-9_000.0, 3_000.0),
    ];
    let munitions = starts
        .iter()
        .enumerate()
        .map(|(i, &position)| MunitionSpawn {
            state: munition_state(position, Vec2::new(300.0, 0.0)),
            target: 0,
            assignment: Assignment {
                archetype,
                group: Some(1),
                slot: Slot {
                    index: i as u32,
                    count: starts.len() as u32,
                },
                // Shared reference so the fan is centred on one axis.
                reference_bearing: Some(0.0),
            },
        })
        .collect();
    ScenarioSetup {
        targets: vec![KinematicState::point(
            Vec2::new(50_000.0, 0.0),
            Vec2::new(-100.0, 50.0),
        )],
        munitions,
    }
}

/// Flip-burn: a fast munition flying away from a target it must approach
/// from the south, heading north.
fn build_flip_burn() -> ScenarioSetup {
    let mut state = munition_state(Vec2::ZERO, Vec2::new(-4_000.0, 0.0));
    state.heading = PI;
    ScenarioSetup {
        targets: vec![KinematicState::point(Vec2::new(4_000.0, 0.0), Vec2::ZERO)],
        munitions: vec![MunitionSpawn {
            state,
            target: 0,
            assignment: Assignment {
                archetype: TrajectoryArchetype::OffsetAngle {
                    approach_angle: FRAC_PI_2,
                    separation: 0.0,
                },
                group: None,
                slot: Slot::single(),
                reference_bearing: Some(0.0),
            },
        }],
    }
}

/// Swarm: hundreds of munitions split across several targets, with jittered
/// launch positions and a mix of all three archetypes.
fn build_swarm(rng: &mut ChaCha8Rng) -> ScenarioSetup {
    let targets: Vec<KinematicState> = (0..SWARM_TARGETS)
        .map(|i| {
            let bearing = (i as f64 / SWARM_TARGETS as f64 - 0.5) * 1.2;
            let range = rng.gen_range(60_000.0..90_000.0);
            let position = Vec2::from_angle(bearing) * range;
            let velocity = Vec2::new(rng.gen_range(-300.0..-100.0), rng.gen_range(-80.0..80.0));
            KinematicState::point(position, velocity)
        })
        .collect();

    let per_target = SWARM_SIZE / SWARM_TARGETS;
    let mut munitions = Vec::with_capacity(SWARM_SIZE);
    for i in 0..SWARM_SIZE {
        let target = i % SWARM_TARGETS;
        let rank = (i / SWARM_TARGETS) as u32;
        let position = Vec2::new(rng.gen_range(-5_000.0..0.0), rng.gen_range(-8_000.0..8_000.0));
        let velocity = Vec2::new(rng.gen_range(200.0..600.0), rng.gen_range(-50.0..50.0));
        // Each target draws a single archetype: i % 3 is fixed per target.
        let archetype = match i % 3 {
            0 => TrajectoryArchetype::Direct,
            1 => TrajectoryArchetype::OffsetAngle {
                approach_angle: rng.gen_range(-0.6..0.6),
                separation: 0.0,
            },
            _ => TrajectoryArchetype::Coordinated { fan_arc: 1.0 },
        };
        let coordinated = matches!(archetype, TrajectoryArchetype::Coordinated { .. });
        munitions.push(MunitionSpawn {
            state: munition_state(position, velocity),
            target,
            assignment: Assignment {
                archetype,
                group: coordinated.then_some(target as u32),
                slot: if coordinated {
                    Slot {
                        index: rank,
                        count: per_target as u32,
                    }
                } else {
                    Slot::single()
                },
                reference_bearing: None,
            },
        });
    }

    ScenarioSetup { targets, munitions }
}
