//! Commands sent by collaborators to the simulation.
//!
//! Commands are queued and processed at the next tick boundary, before the
//! scheduler runs. Entities are named by their stable id.

use serde::{Deserialize, Serialize};

/// Lifecycle actions owned by external collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineCommand {
    /// The munition hit something or expired.
    DestroyMunition { munition: u64 },
    /// The target was destroyed or dropped by the tracker.
    DestroyTarget { target: u64 },
    /// Point a munition at a different target and start a fresh plan.
    Retarget { munition: u64, target: u64 },
}
