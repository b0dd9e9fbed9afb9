//! Simulation host for the salvo guidance core.
//!
//! Owns the munition arena (a hecs `World`), the planning scheduler and the
//! per-tick execution controller, and wires them into a fixed-step loop.

pub mod engagement;
pub mod engine;
pub mod guidance;
pub mod scenario;
pub mod scheduler;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
