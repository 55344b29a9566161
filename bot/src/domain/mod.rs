//! Domain layer: pure records, errors, configuration and classification.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod console;
pub mod error;
pub mod fleet;
pub mod fleet_spec;
pub mod status;

pub use config::{AccessPolicy, BotConfig, ConsoleSettings, PollPolicy};
pub use console::{CommandOutput, ConsoleInvocation, JobReport, strip_control_sequences};
pub use error::{ConfigError, ExecError, LifecycleError, ProviderError};
pub use fleet::{
    AddressRecord, CommandOutcome, FleetOperation, FleetRecord, InstanceRecord, MAX_TARGET_CAPACITY,
};
pub use fleet_spec::FleetSpec;
pub use status::{StatusReport, classify};
