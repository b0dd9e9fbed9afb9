//! Trajectory planner for the salvo guidance core.
//!
//! Turns a batch of planning requests into physically achievable waypoint
//! tails. Everything here is a pure function of its inputs; the
//! [`backend::ComputeBackend`] fans a batch out across worker lanes.

pub mod archetype;
pub mod backend;
pub mod fallback;
pub mod geometry;
pub mod intercept;
pub mod maneuver;
pub mod planner;
pub mod profile;
pub mod validate;

pub use backend::{ComputeBackend, PlanningJob, PlanningReply, RayonBackend};
pub use planner::{earliest_arrival, plan};

#[cfg(test)]
mod tests;
