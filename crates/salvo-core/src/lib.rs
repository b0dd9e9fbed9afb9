//! Core types and definitions for the salvo guidance core.
//!
//! This crate defines the vocabulary shared across the planner and the
//! simulation: kinematic state, waypoints and sequences, planning requests, commands,
//! components, tuning, events, snapshots and constants.
//! It has no dependency on the ECS or the compute backend.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod planning;
pub mod sequence;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
