//! Composite lifecycle classification and the status report it produces.
//!
//! Pure functions only: the resolver service gathers the provider readings,
//! this module reduces them to a `LifecycleState` and renders the report.

use std::fmt::Write as _;

use serde::Serialize;
use spotcraft_common::{FleetState, InstanceState, LifecycleState, Liveness};

use crate::domain::fleet::InstanceRecord;

/// Placeholder for fields the provider did not report.
pub const NOT_AVAILABLE: &str = "N/A";

/// Everything a status query learned, plus its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub state: LifecycleState,
    pub fleet_id: Option<String>,
    /// `None` when the provider no longer knows the persisted fleet id.
    pub fleet_state: Option<FleetState>,
    pub target_capacity: Option<i32>,
    pub instance: Option<InstanceRecord>,
    pub liveness: Option<Liveness>,
    pub elastic_ip: Option<String>,
    /// Provider failure detail when `state` is `Error`.
    pub error: Option<String>,
}

impl StatusReport {
    /// Report for "no fleet id persisted".
    #[must_use]
    pub fn no_fleet() -> Self {
        Self {
            state: LifecycleState::OfflineNoFleet,
            fleet_id: None,
            fleet_state: None,
            target_capacity: None,
            instance: None,
            liveness: None,
            elastic_ip: None,
            error: None,
        }
    }

    /// Report for a query that failed part-way; keeps what was gathered.
    #[must_use]
    pub fn failed(fleet_id: Option<String>, error: impl Into<String>) -> Self {
        Self {
            state: LifecycleState::Error,
            fleet_id,
            error: Some(error.into()),
            ..Self::no_fleet()
        }
    }

    /// The address players should connect to: the elastic address when one
    /// is assigned, otherwise the instance's own public address.
    #[must_use]
    pub fn connect_address(&self) -> Option<&str> {
        self.elastic_ip
            .as_deref()
            .or_else(|| self.instance.as_ref()?.public_ip.as_deref())
    }

    /// Operator advice for the classified state.
    #[must_use]
    pub fn advice(&self) -> String {
        match self.state {
            LifecycleState::OfflineNoFleet => {
                "The server is currently offline. No active fleet ID found.".to_string()
            }
            LifecycleState::FleetGone => "**Fleet is shutting down or unavailable!** \
                 Please run `/start_fleet` to create a new one."
                .to_string(),
            LifecycleState::InstanceUpServiceDown => "**Warning:** The instance is running, \
                 but the **server is OFFLINE**.\nSomething went wrong during startup. \
                 Check logs or run `/start` to try and kickstart the service."
                .to_string(),
            LifecycleState::Ready => format!(
                "**Server ready!** Connect with: `{}`",
                self.connect_address().unwrap_or(NOT_AVAILABLE)
            ),
            LifecycleState::FleetActiveNoInstance => "**Fleet is active but no instance is \
                 running yet.** Run `/start` to start the server."
                .to_string(),
            LifecycleState::FleetTransitioning => {
                "**Fleet loading!** Wait a moment and run `/status` again!".to_string()
            }
            LifecycleState::StatusUnclear => {
                "**Status unclear.** Run `/start_fleet` or contact the admin.".to_string()
            }
            LifecycleState::Error => format!(
                "An error occurred while getting the server status: {}",
                self.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }

    /// Fully rendered report: every gathered field (or `N/A`) followed by the
    /// advice line.
    #[must_use]
    pub fn explanation(&self) -> String {
        if self.state == LifecycleState::OfflineNoFleet {
            return self.advice();
        }

        let instance = self.instance.as_ref();
        let field = |v: Option<&str>| v.unwrap_or(NOT_AVAILABLE).to_string();

        let fleet_state = match (&self.fleet_state, self.state) {
            (Some(state), _) => state.to_string(),
            (None, LifecycleState::FleetGone) => "not found".to_string(),
            (None, _) => NOT_AVAILABLE.to_string(),
        };
        let rows = [
            ("Fleet ID", field(self.fleet_id.as_deref())),
            ("Fleet State", fleet_state),
            (
                "Target Capacity",
                self.target_capacity
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |c| c.to_string()),
            ),
            ("Instance ID", field(instance.map(|i| i.instance_id.as_str()))),
            (
                "Instance State",
                field(instance.and_then(|i| i.state.as_ref()).map(InstanceState::as_str)),
            ),
            (
                "Instance Lifecycle",
                field(instance.and_then(|i| i.lifecycle.as_deref())),
            ),
            (
                "Instance Type",
                field(instance.and_then(|i| i.instance_type.as_deref())),
            ),
            (
                "Server Status",
                self.liveness
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |l| l.to_string()),
            ),
            (
                "Launch Time",
                instance
                    .and_then(|i| i.launch_time)
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |t| t.to_rfc3339()),
            ),
            (
                "Instance Public IP",
                field(instance.and_then(|i| i.public_ip.as_deref())),
            ),
            ("Assigned Elastic IP", field(self.elastic_ip.as_deref())),
        ];

        let mut out = String::from("**Server Status:**\n");
        for (label, value) in rows {
            let _ = write!(out, "\n**{label}:** `{value}`");
        }
        let _ = write!(out, "\n\n{}", self.advice());
        out
    }
}

/// Reduce the gathered readings to a composite state.
///
/// First match wins:
/// 1. fleet unknown to the provider, or cancelled/deleted/failed → `FleetGone`
/// 2. instance running, port refused/timed out → `InstanceUpServiceDown`
/// 3. instance running, port accepting, address known → `Ready`
/// 4. fleet active, instance not running → `FleetActiveNoInstance`
/// 5. fleet submitted or modifying → `FleetTransitioning`
/// 6. anything else → `StatusUnclear`
#[must_use]
pub fn classify(
    fleet_state: Option<&FleetState>,
    instance_state: Option<&InstanceState>,
    liveness: Option<Liveness>,
    address_present: bool,
) -> LifecycleState {
    let Some(fleet_state) = fleet_state else {
        return LifecycleState::FleetGone;
    };
    let running = instance_state == Some(&InstanceState::Running);

    if fleet_state.is_gone() {
        LifecycleState::FleetGone
    } else if running && liveness == Some(Liveness::Offline) {
        LifecycleState::InstanceUpServiceDown
    } else if running && liveness == Some(Liveness::Online) && address_present {
        LifecycleState::Ready
    } else if *fleet_state == FleetState::Active && !running {
        LifecycleState::FleetActiveNoInstance
    } else if matches!(fleet_state, FleetState::Modifying | FleetState::Submitted) {
        LifecycleState::FleetTransitioning
    } else {
        LifecycleState::StatusUnclear
    }
}
