//! Simulation engine: the fixed-step host for the guidance core.
//!
//! `SimulationEngine` owns the hecs ECS world, processes collaborator
//! commands, runs the scheduler and every system, and produces
//! `SalvoSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;

use hecs::{Entity, World};
use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use salvo_core::commands::EngineCommand;
use salvo_core::components::{Assignment, ControllerState, Munition, Target};
use salvo_core::config::SalvoConfig;
use salvo_core::constants::DT;
use salvo_core::enums::{GuidanceMode, MunitionStatus, ScenarioId, TargetStatus};
use salvo_core::error::SalvoError;
use salvo_core::events::SalvoEvent;
use salvo_core::sequence::WaypointSequence;
use salvo_core::state::SalvoSnapshot;
use salvo_core::types::{KinematicState, SimTime};
use salvo_planner::{ComputeBackend, RayonBackend};

use crate::engagement::{entity_from_id, TargetLink};
use crate::scenario;
use crate::scheduler::Scheduler;
use crate::systems;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Simulated seconds per tick.
    pub dt: f64,
    pub tuning: SalvoConfig,
    /// Run the reference motion integrator. Off when a host supplies physics.
    pub integrate_motion: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            dt: DT,
            tuning: SalvoConfig::default(),
            integrate_motion: true,
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    dt: f64,
    integrate_motion: bool,
    rng: ChaCha8Rng,
    config: Arc<SalvoConfig>,
    scheduler: Scheduler,
    command_queue: VecDeque<EngineCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<SalvoEvent>,
}

impl SimulationEngine {
    /// Create an engine on the rayon backend.
    ///
    /// Fails if the tuning is invalid or the backend cannot be brought up;
    /// there is no serial fallback.
    pub fn new(config: SimConfig) -> Result<Self, SalvoError> {
        config.tuning.validate()?;
        let backend = RayonBackend::new(config.tuning.backend.worker_threads)?;
        Self::with_backend(config, Arc::new(backend))
    }

    /// Create an engine on a caller-supplied backend.
    pub fn with_backend(
        config: SimConfig,
        backend: Arc<dyn ComputeBackend>,
    ) -> Result<Self, SalvoError> {
        config.tuning.validate()?;
        info!(
            "simulation engine up: seed {}, dt {:.4}s, backend {} ({} lanes), {:?} planning",
            config.seed,
            config.dt,
            backend.name(),
            backend.lanes(),
            config.tuning.backend.mode
        );
        let tuning = Arc::new(config.tuning);
        Ok(Self {
            world: World::new(),
            time: SimTime::default(),
            dt: config.dt,
            integrate_motion: config.integrate_motion,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            scheduler: Scheduler::new(Arc::clone(&tuning), backend),
            config: tuning,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Spawn a tracked target.
    pub fn spawn_target(&mut self, state: KinematicState) -> Entity {
        world_setup::spawn_target(&mut self.world, state)
    }

    /// Spawn a munition engaging `target`, with a seeded sequence.
    pub fn spawn_munition(
        &mut self,
        state: KinematicState,
        target: Entity,
        assignment: Assignment,
    ) -> Entity {
        world_setup::spawn_munition(&mut self.world, state, target, assignment, &self.config.planner)
    }

    /// Spawn a built-in scenario. Returns the munitions in spawn order.
    pub fn load_scenario(&mut self, id: ScenarioId) -> Vec<Entity> {
        let setup = scenario::build(id, &mut self.rng);
        info!(
            "scenario {}: {} targets, {} munitions",
            id.name(),
            setup.targets.len(),
            setup.munitions.len()
        );
        let targets: Vec<Entity> = setup
            .targets
            .iter()
            .map(|&state| self.spawn_target(state))
            .collect();
        setup
            .munitions
            .iter()
            .filter_map(|spawn| {
                let target = *targets.get(spawn.target)?;
                Some(self.spawn_munition(spawn.state, target, spawn.assignment))
            })
            .collect()
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: EngineCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = EngineCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> SalvoSnapshot {
        self.process_commands();
        self.run_systems();
        self.time.advance(self.dt);

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, self.scheduler.view(), events)
    }

    /// Wait for an in-flight pipelined batch and merge it now.
    pub fn flush_planning(&mut self) {
        self.scheduler.flush(&mut self.world, &mut self.events);
    }

    /// Overwrite a munition's kinematic state (hosts with their own physics).
    pub fn set_munition_state(&mut self, munition: Entity, state: KinematicState) -> bool {
        match self.world.get::<&mut Munition>(munition) {
            Ok(mut m) => {
                m.state = state;
                true
            }
            Err(_) => false,
        }
    }

    /// Overwrite a target's kinematic state (hosts with their own tracker).
    pub fn set_target_state(&mut self, target: Entity, state: KinematicState) -> bool {
        match self.world.get::<&mut Target>(target) {
            Ok(mut t) => {
                t.state = state;
                true
            }
            Err(_) => false,
        }
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &SalvoConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Run all systems in order.
    fn run_systems(&mut self) {
        let now = self.time.elapsed_secs;

        // 1. Scheduler: poll or dispatch planning, merge results
        self.scheduler.run(&mut self.world, now, &mut self.events);

        // 2. Execution controller: per-tick guidance commands
        systems::execution::run(&mut self.world, &self.config.guidance, self.dt, &mut self.events);

        // 3. Reference motion integrator
        if self.integrate_motion {
            systems::movement::run(&mut self.world, self.dt);
        }

        // 4. Cleanup: despawn destroyed entities
        systems::cleanup::run(&mut self.world, &mut self.despawn_buffer);
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single collaborator command. Unknown ids are ignored.
    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::DestroyMunition { munition } => {
                let Some(entity) = entity_from_id(munition) else {
                    return;
                };
                if let Ok(mut m) = self.world.get::<&mut Munition>(entity) {
                    m.status = MunitionStatus::MarkedForRemoval;
                }
            }
            EngineCommand::DestroyTarget { target } => {
                let Some(entity) = entity_from_id(target) else {
                    return;
                };
                if let Ok(mut t) = self.world.get::<&mut Target>(entity) {
                    t.status = TargetStatus::Destroyed;
                }
            }
            EngineCommand::Retarget { munition, target } => {
                let (Some(munition), Some(target)) = (entity_from_id(munition), entity_from_id(target))
                else {
                    return;
                };
                self.retarget(munition, target);
            }
        }
    }

    /// Point a munition at a new target and reseed its sequence.
    fn retarget(&mut self, munition: Entity, target: Entity) {
        let Some(target_state) = TargetLink::new(target).resolve(&self.world) else {
            debug!("retarget ignored: target is not tracked");
            return;
        };
        let planner = &self.config.planner;
        let Ok((m, link, sequence, controller)) = self.world.query_one_mut::<(
            &mut Munition,
            &mut TargetLink,
            &mut WaypointSequence,
            &mut ControllerState,
        )>(munition) else {
            return;
        };
        if m.status != MunitionStatus::Active {
            return;
        }

        // Approach angles are re-referenced to the new line of sight.
        let unresolved = Assignment {
            reference_bearing: None,
            ..m.assignment
        };
        m.assignment.reference_bearing = Some(world_setup::resolve_bearing(
            &unresolved,
            &m.state,
            &target_state,
        ));
        link.target = Some(target);
        let waypoints = world_setup::seed_waypoints(&m.state, &target_state, &m.assignment, planner);
        let mode = waypoints
            .first()
            .map_or(GuidanceMode::Coast, |w| GuidanceMode::for_maneuver(w.kind));
        sequence.reseed(waypoints);
        *controller = ControllerState {
            mode,
            seen_generation: sequence.generation(),
            ..ControllerState::default()
        };
    }
}
