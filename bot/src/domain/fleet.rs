//! Fleet, instance and address records as reported by the provider.
//!
//! This module is intentionally free of I/O, async, and external layer imports.

use chrono::{DateTime, Utc};
use serde::Serialize;
use spotcraft_common::{FleetState, InstanceState};

/// The only target capacities this system ever requests.
pub const MAX_TARGET_CAPACITY: i32 = 1;

/// The fleet-mutating operation a precondition failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetOperation {
    Delete,
    Start,
    Stop,
}

impl FleetOperation {
    /// Start for any positive capacity, stop for zero.
    #[must_use]
    pub fn for_capacity(target: i32) -> Self {
        if target > 0 { Self::Start } else { Self::Stop }
    }
}

/// A provider-side fleet request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FleetRecord {
    pub fleet_id: String,
    pub state: FleetState,
    pub target_capacity: i32,
}

/// The compute instance owned by the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceRecord {
    pub instance_id: String,
    pub state: Option<InstanceState>,
    pub public_ip: Option<String>,
    pub instance_type: Option<String>,
    pub launch_time: Option<DateTime<Utc>>,
    /// `spot`, `scheduled`, ...; absent for on-demand instances.
    pub lifecycle: Option<String>,
}

impl InstanceRecord {
    /// Whether the provider reports the instance as `running`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == Some(InstanceState::Running)
    }
}

/// A reserved public address, managed out-of-band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    pub allocation_id: String,
    pub public_ip: Option<String>,
}

/// Successful result of a fleet-mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A new fleet was created and its id persisted.
    FleetCreated {
        fleet_id: String,
        /// The id this create overwrote, if any.
        replaced: Option<String>,
    },
    /// The fleet and its instances were deleted.
    FleetDeleted { fleet_id: String },
    /// A target-capacity change was requested (not awaited).
    CapacityRequested { fleet_id: String, target: i32 },
}

impl std::fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FleetCreated { fleet_id, .. } => {
                write!(f, "Successfully created new fleet: `{fleet_id}`.")
            }
            Self::FleetDeleted { fleet_id } => {
                write!(f, "Successfully deleted fleet: `{fleet_id}`.")
            }
            Self::CapacityRequested { target, .. } if *target > 0 => f.write_str(
                "Server startup initiated! Please allow a few minutes for the instance to boot.",
            ),
            Self::CapacityRequested { .. } => f.write_str(
                "Server shutdown initiated! The instance will be terminated shortly.",
            ),
        }
    }
}
