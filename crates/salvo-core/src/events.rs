//! Events emitted by the core for telemetry and visualization collaborators.
//!
//! Advisory only: nothing in the core depends on anyone consuming them.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::error::PlanFault;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SalvoEvent {
    /// A merge replaced the unprotected tail; the generation changed.
    WaypointsUpdated {
        munition: u64,
        generation: u64,
        tail_len: usize,
    },
    /// Planning fell back to a straight-line tail.
    PlanDegraded { munition: u64, fault: PlanFault },
    /// The state collector left a munition out of a batch.
    MunitionRejected { munition: u64, reason: RejectReason },
    /// A result arrived for a munition that is no longer valid.
    ResultDropped { munition: u64 },
    /// The munition's target disappeared; it coasts until retargeted.
    TargetLost { munition: u64 },
    /// The execution controller advanced past a waypoint.
    WaypointReached {
        munition: u64,
        index: usize,
        reason: AcceptReason,
    },
    /// The scheduler changed its planning period.
    PeriodChanged { period_secs: f64 },
}
