//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are pure functions that take `&mut World` (or `&World` for read-only).
//! They do not own state; all state lives in components, plus the
//! scheduler's own bookkeeping in [`crate::scheduler::Scheduler`].

pub mod cleanup;
pub mod collector;
pub mod continuation;
pub mod execution;
pub mod merge;
pub mod movement;
pub mod snapshot;
