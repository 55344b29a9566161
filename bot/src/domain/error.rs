//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! Every variant's `Display` is the operator-facing sentence the chat reply
//! shows, so callers render errors with `to_string()`.

use spotcraft_common::{FleetState, InstanceState, JobStatus, Liveness};

use crate::domain::fleet::FleetOperation;
use thiserror::Error;

// ── Provider errors ───────────────────────────────────────────────────────────

/// The single error representation for every Capability Provider call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider does not know the identifier (stale or never existed).
    #[error("{resource} `{id}` was not found")]
    NotFound { resource: &'static str, id: String },

    /// The provider rejected the call with an error code.
    #[error("{operation} failed ({code}): {message}")]
    Api {
        operation: &'static str,
        code: String,
        message: String,
    },

    /// The call never produced a provider answer (network, timeout, credentials).
    #[error("{operation} failed: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// The provider answered without a field the core depends on.
    #[error("{operation} returned an unexpected response: {message}")]
    Contract {
        operation: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Whether this is the recoverable "stale identifier" class.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Lifecycle errors ──────────────────────────────────────────────────────────

/// Precondition and provider failures of the fleet-mutating operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{}", no_fleet_message(.operation))]
    NoFleet { operation: FleetOperation },

    #[error("Cannot create a new fleet: the current fleet is active! Current fleet status: `{state}`.")]
    AlreadyActive { state: FleetState },

    /// `state` is `None` when the provider no longer knows the fleet id.
    #[error(
        "Cannot delete fleet: the current fleet is not active! Current fleet status: `{}`.",
        fleet_state_name(.state.as_ref())
    )]
    NotActive { state: Option<FleetState> },

    #[error(
        "Cannot change the server capacity: the fleet request is `{}`. Create a new fleet with `/start_fleet`.",
        fleet_state_name(.state.as_ref())
    )]
    FleetGone { state: Option<FleetState> },

    #[error("{}", at_target_message(.capacity))]
    AlreadyAtTarget { capacity: i32 },

    #[error("Target capacity must be 0 or 1, got {0}.")]
    InvalidCapacity(i32),

    #[error("Cannot create a fleet: no fleet specification is configured.")]
    NoFleetSpec,

    #[error("ERROR: {0}")]
    ProviderContractViolation(String),

    #[error("An error occurred: {0}")]
    Provider(#[from] ProviderError),
}

impl LifecycleError {
    /// Precondition rejections leave the provider untouched.
    #[must_use]
    pub fn is_precondition(&self) -> bool {
        !matches!(
            self,
            Self::Provider(_) | Self::ProviderContractViolation(_)
        )
    }
}

// ── Remote command errors ─────────────────────────────────────────────────────

/// Reasons a console command was not run or did not finish.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Server is offline. No fleet ID found.")]
    NoFleet,

    #[error(
        "No instances found in the fleet. Server might be starting or has stopped. Run `/status` for more information!"
    )]
    NoInstance,

    #[error("Failed to get instance public IP!")]
    NoPublicAddress,

    #[error("Failed to run command: instance not running (state `{}`).", state_name(.0.as_ref()))]
    NotRunning(Option<InstanceState>),

    #[error("Failed to run command: server not available (port check `{0}`)!")]
    ServiceUnavailable(Liveness),

    #[error("Failed to run command: the remote console password is not configured.")]
    MissingSecret,

    #[error(
        "Command timed out after {polls} status checks (job `{job_id}`, last status `{last}`). Check the job logs or run it again."
    )]
    Timeout {
        job_id: String,
        polls: u32,
        last: JobStatus,
    },

    #[error("Failed to run command. Check permissions and the remote agent status. Error: {0}")]
    Provider(#[from] ProviderError),
}

fn state_name(state: Option<&InstanceState>) -> &str {
    state.map_or("N/A", InstanceState::as_str)
}

fn fleet_state_name(state: Option<&FleetState>) -> &str {
    state.map_or("not found", FleetState::as_str)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn no_fleet_message(operation: &FleetOperation) -> &'static str {
    match operation {
        FleetOperation::Delete => "Cannot delete fleet: no fleet registered!",
        FleetOperation::Start => {
            "Cannot start the server: no fleet registered! Run `/start_fleet` to start a fleet."
        }
        FleetOperation::Stop => "Cannot stop the server: no fleet registered!",
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn at_target_message(capacity: &i32) -> &'static str {
    if *capacity > 0 {
        "The server is already running or in the process of starting."
    } else {
        "The server is already stopped or in the process of stopping."
    }
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Invalid configuration detected before serving any request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("invalid fleet specification: {0}")]
    InvalidFleetSpec(String),
}
